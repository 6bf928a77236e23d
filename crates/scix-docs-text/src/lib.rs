//! scix-docs-text
//!
//! In-memory full-text search over the SciX help documentation corpus:
//! tantivy index construction, fuzzy/prefix weighted ranking with a relative
//! score cutoff, query-centered snippets, and category/stats accessors.
//! See `service` for the public entry points.

pub mod index;
pub mod query;
pub mod service;
pub mod snippet;
pub mod tantivy_utils;

pub use query::{Combinator, FieldBoosts, SearchOptions};
pub use service::{default_corpus_path, get_doc_by_id, get_stats, search_by_category, search_docs, DocSearch};
pub use snippet::make_snippet;
