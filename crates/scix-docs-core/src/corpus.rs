//! Corpus loading and cleaning.
//!
//! The corpus is a JSON array of raw chunk records. Records are parsed one by
//! one so a malformed entry is skipped instead of failing the whole load.
//! Each record is normalized (markdown links and markup stripped, whitespace
//! collapsed), given a usable title, and dropped if it is navigation noise,
//! a 404 page, or has no body left.

use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::DocumentChunk;

/// Title of scraped "page not found" chunks.
pub const NOT_FOUND_TITLE: &str = "404";

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid link regex"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("valid tag regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HEADING_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("valid heading mark regex"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+(.+?)[ \t#]*$").expect("valid heading regex")
});
static WHATS_NEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)what[\s_'’-]*s[\s_-]*new").expect("valid noise regex")
});

/// A corpus record as found on disk. Fields that are absent, null or of
/// another JSON type than string/number/bool default to empty.
#[derive(Debug, Default)]
struct RawChunk {
    id: String,
    source_file: String,
    source_url: String,
    doc_type: String,
    category: String,
    title: String,
    section: String,
    subsection: String,
    content: String,
}

impl RawChunk {
    fn from_object(record: &Map<String, Value>) -> Self {
        let field = |key: &str| match record.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        };
        Self {
            id: field("id"),
            source_file: field("source_file"),
            source_url: field("source_url"),
            doc_type: field("doc_type"),
            category: field("category"),
            title: field("title"),
            section: field("section"),
            subsection: field("subsection"),
            content: field("content"),
        }
    }
}

/// Why a record did not make it into the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NavigationNoise,
    NotFoundPage,
    EmptyTitle,
    EmptyContent,
}

/// Parse and clean the corpus text read from `path`.
///
/// Fails only when the text is not a JSON array. Entries that are not
/// objects are skipped with a warning; mistyped fields default to empty.
pub fn parse_corpus(json: &str, path: &Path) -> Result<Vec<DocumentChunk>> {
    let records: Vec<Value> = serde_json::from_str(json)
        .map_err(|source| Error::Parse { path: path.to_path_buf(), source })?;

    let total = records.len();
    let mut chunks = Vec::with_capacity(total);
    for (position, record) in records.into_iter().enumerate() {
        let Value::Object(object) = record else {
            warn!(position, "Skipping corpus record that is not an object");
            continue;
        };
        let raw = RawChunk::from_object(&object);
        match clean_record(raw) {
            Ok(chunk) => chunks.push(chunk),
            Err((id, reason)) => debug!(position, id = %id, ?reason, "Dropping corpus record"),
        }
    }

    info!(
        path = %path.display(),
        kept = chunks.len(),
        dropped = total - chunks.len(),
        "Loaded docs corpus"
    );
    Ok(chunks)
}

fn clean_record(raw: RawChunk) -> std::result::Result<DocumentChunk, (String, DropReason)> {
    let RawChunk { id, source_file, source_url, doc_type, category, title, section, subsection, content: raw_content } =
        raw;

    if [&source_file, &source_url, &id].iter().any(|s| is_navigation_noise(s)) {
        return Err((id, DropReason::NavigationNoise));
    }

    let section = clean_text(&section);
    let subsection = clean_text(&subsection);
    let title = derive_title(
        &raw_content,
        &subsection,
        &section,
        &clean_text(&title),
        &source_file,
        &id,
    );
    let content = clean_text(&raw_content);

    if title.is_empty() {
        return Err((id, DropReason::EmptyTitle));
    }
    if title == NOT_FOUND_TITLE {
        return Err((id, DropReason::NotFoundPage));
    }
    if content.is_empty() {
        return Err((id, DropReason::EmptyContent));
    }

    Ok(DocumentChunk {
        char_count: content.chars().count(),
        id,
        source_file,
        source_url,
        doc_type,
        category,
        title,
        section,
        subsection,
        content,
    })
}

/// Strip markdown links (keeping their text), heading marks and HTML tags,
/// then collapse whitespace runs to single spaces.
pub fn clean_text(text: &str) -> String {
    let text = MARKDOWN_LINK.replace_all(text, "$1");
    let text = HEADING_MARK.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// True for "what's new" style navigation pages, whatever the separators.
pub fn is_navigation_noise(text: &str) -> bool {
    WHATS_NEW.is_match(text)
}

/// First markdown heading of the raw content, cleaned.
pub fn first_heading(raw_content: &str) -> Option<String> {
    HEADING.captures(raw_content).map(|caps| clean_text(&caps[1]))
}

/// Pick the first usable title: heading, subsection, section, existing title,
/// file name, then id. Candidates that look like navigation noise are skipped.
pub fn derive_title(
    raw_content: &str,
    subsection: &str,
    section: &str,
    title: &str,
    source_file: &str,
    id: &str,
) -> String {
    let heading = first_heading(raw_content).unwrap_or_default();
    let file_title = humanize_filename(source_file);
    let derived = [heading.as_str(), subsection, section, title, file_title.as_str(), id.trim()]
        .into_iter()
        .find(|candidate| !candidate.is_empty() && !is_navigation_noise(candidate))
        .map(str::to_string)
        .unwrap_or_default();
    derived
}

/// "docs/search-syntax_guide.md" -> "Search Syntax Guide".
pub fn humanize_filename(source_file: &str) -> String {
    let name = source_file.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    stem.split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_links_tags_and_whitespace() {
        let raw = "See  [the API docs](https://ui.adsabs.harvard.edu/help/api/)\n\nfor <b>details</b>.";
        assert_eq!(clean_text(raw), "See the API docs for details .");
    }

    #[test]
    fn clean_text_drops_heading_marks() {
        assert_eq!(clean_text("## Author Search\nUse author:"), "Author Search Use author:");
        assert_eq!(clean_text("C# and #hashtags stay"), "C# and #hashtags stay");
    }

    #[test]
    fn clean_text_keeps_image_alt_text() {
        assert_eq!(clean_text("![logo](img/logo.png) SciX"), "logo SciX");
    }

    #[test]
    fn navigation_noise_tolerates_separators() {
        for s in ["What's New", "whats-new", "what_s_new.md", "WHAT S NEW", "help_whats_new/"] {
            assert!(is_navigation_noise(s), "{s} should be noise");
        }
        assert!(!is_navigation_noise("What is a bibcode"));
        assert!(!is_navigation_noise("newsletter"));
    }

    #[test]
    fn heading_wins_over_labels() {
        let title = derive_title("intro\n## Author Search ##\nbody", "Sub", "Sec", "Title", "f.md", "id");
        assert_eq!(title, "Author Search");
    }

    #[test]
    fn title_falls_back_in_order() {
        assert_eq!(derive_title("body", "Sub", "Sec", "Title", "f.md", "id"), "Sub");
        assert_eq!(derive_title("body", "", "Sec", "Title", "f.md", "id"), "Sec");
        assert_eq!(derive_title("body", "", "", "Title", "f.md", "id"), "Title");
        assert_eq!(derive_title("body", "", "", "", "docs/first-steps.md", "id"), "First Steps");
        assert_eq!(derive_title("body", "", "", "", "", "chunk-7"), "chunk-7");
    }

    #[test]
    fn noisy_candidates_are_skipped() {
        let title = derive_title("# What's New\nbody", "", "Release notes", "", "", "x");
        assert_eq!(title, "Release notes");
    }

    #[test]
    fn humanize_filename_title_cases_words() {
        assert_eq!(humanize_filename("help/search/search-syntax_guide.md"), "Search Syntax Guide");
        assert_eq!(humanize_filename("README"), "README");
        assert_eq!(humanize_filename(""), "");
    }
}
