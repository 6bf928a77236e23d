use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scix_docs_core::config::{resolve_with_base, Config};
use scix_docs_text::{default_corpus_path, DocSearch, SearchOptions};

const USAGE: &str = "\
Usage: scix-docs-search [options] <query...>

Options:
  --limit N         maximum number of hits
  --category CAT    restrict to one category (query may be empty)
  --id ID           print a single chunk by id
  --stats           print corpus statistics
  --categories      list the categories present in the corpus
  --corpus PATH     read chunks from PATH instead of the shipped corpus";

#[derive(Default)]
struct Args {
    limit: Option<f64>,
    category: Option<String>,
    id: Option<String>,
    stats: bool,
    categories: bool,
    corpus: Option<PathBuf>,
    query: Vec<String>,
}

impl Args {
    fn has_mode(&self) -> bool {
        self.stats || self.categories || self.id.is_some() || self.category.is_some()
    }
}

fn usage() -> ! {
    eprintln!("{USAGE}");
    std::process::exit(1)
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--limit" => {
                let value = it.next().context("--limit needs a value")?;
                args.limit = Some(value.parse().with_context(|| format!("invalid --limit '{value}'"))?);
            }
            "--category" => args.category = Some(it.next().context("--category needs a value")?),
            "--id" => args.id = Some(it.next().context("--id needs a value")?),
            "--corpus" => args.corpus = Some(PathBuf::from(it.next().context("--corpus needs a value")?)),
            "--stats" => args.stats = true,
            "--categories" => args.categories = true,
            "-h" | "--help" => usage(),
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
            _ => args.query.push(arg),
        }
    }
    Ok(args)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = parse_args()?;
    let query = args.query.join(" ");
    if query.trim().is_empty() && !args.has_mode() {
        usage();
    }

    let engine = Config::load().context("Error loading config")?.engine()?;
    let corpus_path = match (&args.corpus, &engine.corpus_path) {
        (Some(path), _) => path.clone(),
        (None, Some(configured)) => resolve_with_base(&env::current_dir()?, configured),
        (None, None) => default_corpus_path(),
    };
    debug!(corpus = %corpus_path.display(), "Using docs corpus");
    let search = DocSearch::new(corpus_path, engine);

    let output = if args.stats {
        serde_json::to_string_pretty(&search.get_stats().await?)?
    } else if args.categories {
        serde_json::to_string_pretty(&search.categories().await?)?
    } else if let Some(id) = &args.id {
        match search.get_doc_by_id(id).await? {
            Some(doc) => serde_json::to_string_pretty(&doc)?,
            None => bail!("no document with id '{id}'"),
        }
    } else if let Some(category) = &args.category {
        serde_json::to_string_pretty(&search.search_by_category(category, &query, args.limit).await?)?
    } else {
        serde_json::to_string_pretty(&search.search_docs(&query, args.limit, &SearchOptions::default()).await?)?
    };
    println!("{output}");
    Ok(())
}
