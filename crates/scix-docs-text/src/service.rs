//! The documentation search service.
//!
//! `DocSearch` loads the corpus and builds the index on first use. The build
//! runs behind a `tokio::sync::OnceCell`, so callers arriving while it is in
//! flight wait for that same build instead of starting their own. A failed
//! build leaves the cell empty and is attempted again on the next call.

use std::collections::{BTreeSet, HashMap};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tokio::sync::OnceCell;
use tracing::debug;

use scix_docs_core::config::EngineConfig;
use scix_docs_core::corpus::parse_corpus;
use scix_docs_core::error::{Error, Result};
use scix_docs_core::types::{DocumentChunk, SearchHit, Stats};

use crate::index::DocIndex;
use crate::query::{apply_score_cutoff, coerce_limit, FieldBoosts, MatchOptions, SearchOptions};
use crate::snippet::{head_snippet, make_snippet};

const CORPUS_RELATIVE_PATH: &str = "data/docs_chunks.json";

/// Location of the shipped corpus.
///
/// Looks for `data/docs_chunks.json` under the current directory, then next
/// to the running executable, and falls back to the workspace checkout the
/// crate was built from.
pub fn default_corpus_path() -> PathBuf {
    let exe_dir = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));
    let bases = env::current_dir().ok().into_iter().chain(exe_dir);
    locate_corpus(bases).unwrap_or_else(|| {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .nth(2)
            .unwrap_or(Path::new("."))
            .join(CORPUS_RELATIVE_PATH)
    })
}

/// First `base/data/docs_chunks.json` that exists.
fn locate_corpus(bases: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    bases.into_iter().map(|base| base.join(CORPUS_RELATIVE_PATH)).find(|path| path.is_file())
}

struct IndexState {
    chunks: Vec<DocumentChunk>,
    by_id: HashMap<String, usize>,
    index: DocIndex,
}

impl IndexState {
    async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Load { path: path.to_path_buf(), source })?;
        let chunks = parse_corpus(&json, path)?;
        let index = DocIndex::build(&chunks)?;
        let mut by_id = HashMap::with_capacity(chunks.len());
        for (pos, chunk) in chunks.iter().enumerate() {
            by_id.entry(chunk.id.clone()).or_insert(pos);
        }
        Ok(Self { chunks, by_id, index })
    }
}

pub struct DocSearch {
    corpus_path: PathBuf,
    config: EngineConfig,
    state: OnceCell<IndexState>,
}

impl DocSearch {
    pub fn new(corpus_path: impl Into<PathBuf>, config: EngineConfig) -> Self {
        Self { corpus_path: corpus_path.into(), config, state: OnceCell::new() }
    }

    /// Process-wide instance over the shipped corpus with default tuning.
    pub fn global() -> &'static DocSearch {
        static GLOBAL: OnceLock<DocSearch> = OnceLock::new();
        GLOBAL.get_or_init(|| DocSearch::new(default_corpus_path(), EngineConfig::default()))
    }

    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }

    async fn state(&self) -> Result<&IndexState> {
        self.state.get_or_try_init(|| IndexState::load(&self.corpus_path)).await
    }

    /// Ranked hits for `query`.
    ///
    /// `limit` defaults to 5 when missing or not finite and is floored to at
    /// least 1. Hits scoring below `score_cutoff` times the best score are
    /// dropped before truncation.
    pub async fn search_docs(
        &self,
        query: &str,
        limit: Option<f64>,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let state = self.state().await?;
        let limit = coerce_limit(limit, self.config.default_limit);
        let match_options =
            MatchOptions::new(self.config.fuzzy, FieldBoosts::GLOBAL).with_overrides(options);

        let mut matches = state.index.matches(query, &match_options)?;
        apply_score_cutoff(&mut matches, self.config.score_cutoff);
        matches.truncate(limit.min(state.chunks.len()));

        let terms: Vec<&str> = query.split_whitespace().collect();
        let hits = matches
            .into_iter()
            .filter_map(|(ord, score)| state.chunks.get(ord).map(|chunk| (chunk, score)))
            .map(|(chunk, score)| {
                SearchHit::from_chunk(chunk, score, make_snippet(&chunk.content, &terms, self.config.snippet_len))
            })
            .collect::<Vec<_>>();
        debug!(query, limit, hits = hits.len(), "search_docs");
        Ok(hits)
    }

    /// Exact id lookup; `None` when no retained chunk has that id.
    pub async fn get_doc_by_id(&self, id: &str) -> Result<Option<DocumentChunk>> {
        let state = self.state().await?;
        Ok(state.by_id.get(id).and_then(|&pos| state.chunks.get(pos)).cloned())
    }

    /// Hits restricted to chunks whose category equals `category`.
    ///
    /// An empty query lists the category in corpus order with score 0.
    /// Otherwise a throwaway index over the category is queried; unlike
    /// [`DocSearch::search_docs`] no score cutoff is applied.
    pub async fn search_by_category(
        &self,
        category: &str,
        query: &str,
        limit: Option<f64>,
    ) -> Result<Vec<SearchHit>> {
        let state = self.state().await?;
        let limit = coerce_limit(limit, self.config.category_limit);
        let subset: Vec<&DocumentChunk> = state.chunks.iter().filter(|c| c.category == category).collect();

        if query.trim().is_empty() {
            return Ok(subset
                .into_iter()
                .take(limit)
                .map(|chunk| SearchHit::from_chunk(chunk, 0.0, head_snippet(&chunk.content, self.config.snippet_len)))
                .collect());
        }
        if subset.is_empty() {
            return Ok(Vec::new());
        }

        let index = DocIndex::build(subset.iter().copied())?;
        let match_options = MatchOptions::new(self.config.fuzzy, FieldBoosts::CATEGORY);
        let terms: Vec<&str> = query.split_whitespace().collect();
        let hits = index
            .matches(query, &match_options)?
            .into_iter()
            .filter_map(|(ord, score)| subset.get(ord).map(|chunk| (*chunk, score)))
            .take(limit)
            .map(|(chunk, score)| {
                SearchHit::from_chunk(chunk, score, make_snippet(&chunk.content, &terms, self.config.snippet_len))
            })
            .collect::<Vec<_>>();
        debug!(category, query, limit, hits = hits.len(), "search_by_category");
        Ok(hits)
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        let state = self.state().await?;
        Ok(Stats::from_chunks(&state.chunks))
    }

    /// Distinct categories present in the corpus, sorted.
    pub async fn categories(&self) -> Result<Vec<String>> {
        let state = self.state().await?;
        let categories: BTreeSet<&str> = state.chunks.iter().map(|c| c.category.as_str()).collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }
}

/// [`DocSearch::search_docs`] on the process-wide instance.
pub async fn search_docs(query: &str, limit: Option<f64>, options: &SearchOptions) -> Result<Vec<SearchHit>> {
    DocSearch::global().search_docs(query, limit, options).await
}

/// [`DocSearch::get_doc_by_id`] on the process-wide instance.
pub async fn get_doc_by_id(id: &str) -> Result<Option<DocumentChunk>> {
    DocSearch::global().get_doc_by_id(id).await
}

/// [`DocSearch::search_by_category`] on the process-wide instance.
pub async fn search_by_category(category: &str, query: &str, limit: Option<f64>) -> Result<Vec<SearchHit>> {
    DocSearch::global().search_by_category(category, query, limit).await
}

/// [`DocSearch::get_stats`] on the process-wide instance.
pub async fn get_stats() -> Result<Stats> {
    DocSearch::global().get_stats().await
}
