//! Domain types shared by the corpus loader and the search engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ChunkId = String;

/// A cleaned documentation chunk, immutable once loaded.
///
/// - `id`: unique chunk identifier from the corpus
/// - `source_file`/`source_url`: provenance of the chunk
/// - `doc_type`/`category`: classification tags; `category` is an open string
/// - `title`/`section`/`subsection`: hierarchical labels, `title` never empty
/// - `content`: normalized plain-text body, never empty
/// - `char_count`: always equal to the number of chars in `content`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub source_file: String,
    pub source_url: String,
    pub doc_type: String,
    pub category: String,
    pub title: String,
    pub section: String,
    pub subsection: String,
    pub content: String,
    pub char_count: usize,
}

/// One ranked match for a query.
///
/// Carries the descriptive fields of the matched chunk (not its body).
/// `score` is only comparable with other hits from the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: ChunkId,
    pub title: String,
    pub section: String,
    pub subsection: String,
    pub category: String,
    pub doc_type: String,
    pub source_file: String,
    pub source_url: String,
    pub score: f32,
    pub snippet: String,
}

impl SearchHit {
    pub fn from_chunk(chunk: &DocumentChunk, score: f32, snippet: String) -> Self {
        Self {
            id: chunk.id.clone(),
            title: chunk.title.clone(),
            section: chunk.section.clone(),
            subsection: chunk.subsection.clone(),
            category: chunk.category.clone(),
            doc_type: chunk.doc_type.clone(),
            source_file: chunk.source_file.clone(),
            source_url: chunk.source_url.clone(),
            score,
            snippet,
        }
    }
}

/// Aggregate figures over the whole cleaned corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_docs: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_doc_type: BTreeMap<String, usize>,
    pub avg_content_length: usize,
}

impl Stats {
    pub fn from_chunks(chunks: &[DocumentChunk]) -> Self {
        let mut stats = Self { total_docs: chunks.len(), ..Self::default() };
        let mut total_chars = 0usize;
        for chunk in chunks {
            *stats.by_category.entry(chunk.category.clone()).or_insert(0) += 1;
            *stats.by_doc_type.entry(chunk.doc_type.clone()).or_insert(0) += 1;
            total_chars += chunk.content.chars().count();
        }
        if !chunks.is_empty() {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let avg = (total_chars as f64 / chunks.len() as f64).round() as usize;
            stats.avg_content_length = avg;
        }
        stats
    }
}
