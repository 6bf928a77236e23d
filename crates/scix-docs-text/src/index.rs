use std::time::Instant;

use tantivy::collector::TopDocs;
use tantivy::schema::Value;
use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tracing::{debug, info};

use scix_docs_core::error::{Error, Result};
use scix_docs_core::types::DocumentChunk;

use crate::query::{build_query, MatchOptions};
use crate::tantivy_utils::{build_analyzer, build_schema, register_tokenizer, DocFields};

const WRITER_HEAP_BYTES: usize = 15_000_000;

pub(crate) fn index_err(e: impl std::fmt::Display) -> Error {
	Error::Index(e.to_string())
}

/// In-RAM inverted index over a slice of chunks.
///
/// Each indexed document stores only its position (`ord`) in the slice it was
/// built from; descriptive fields are served from that slice.
pub struct DocIndex {
	reader: IndexReader,
	fields: DocFields,
	analyzer: TextAnalyzer,
	num_docs: usize,
}

impl DocIndex {
	pub fn build<'a, I>(chunks: I) -> Result<Self>
	where
		I: IntoIterator<Item = &'a DocumentChunk>,
	{
		let started = Instant::now();
		let (schema, fields) = build_schema();
		let index = Index::create_in_ram(schema);
		register_tokenizer(&index);

		let mut index_writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES).map_err(index_err)?;
		let mut num_docs = 0usize;
		for (ord, c) in chunks.into_iter().enumerate() {
			let doc = doc!(
				fields.ord => ord as u64,
				fields.title => c.title.clone(),
				fields.section => c.section.clone(),
				fields.subsection => c.subsection.clone(),
				fields.content => c.content.clone(),
				fields.doc_type => c.doc_type.clone(),
				fields.category => c.category.clone(),
			);
			index_writer.add_document(doc).map_err(index_err)?;
			num_docs += 1;
		}
		index_writer.commit().map_err(index_err)?;

		let reader: IndexReader = index
			.reader_builder()
			.reload_policy(ReloadPolicy::Manual)
			.try_into()
			.map_err(index_err)?;
		info!(docs = num_docs, elapsed = ?started.elapsed(), "Built docs index");
		Ok(Self { reader, fields, analyzer: build_analyzer(), num_docs })
	}

	pub fn num_docs(&self) -> usize {
		self.num_docs
	}

	/// Split `text` into index terms with the analyzer used at index time.
	pub fn analyze(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut terms = Vec::new();
		while let Some(token) = stream.next() {
			terms.push(token.text.clone());
		}
		terms
	}

	/// Every document matching `query_text`, as `(ord, score)` sorted by
	/// descending score. Equal scores keep index order.
	pub fn matches(&self, query_text: &str, options: &MatchOptions) -> Result<Vec<(usize, f32)>> {
		let terms = self.analyze(query_text);
		let Some(query) = build_query(&terms, &self.fields, options) else {
			return Ok(Vec::new());
		};
		if self.num_docs == 0 {
			return Ok(Vec::new());
		}

		let searcher = self.reader.searcher();
		let top_docs = searcher.search(query.as_ref(), &TopDocs::with_limit(self.num_docs)).map_err(index_err)?;
		let mut matches = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr).map_err(index_err)?;
			let ord = doc
				.get_first(self.fields.ord)
				.and_then(|v| v.as_u64())
				.ok_or_else(|| Error::Index(format!("document {addr:?} has no ord")))?;
			let ord = usize::try_from(ord).map_err(index_err)?;
			matches.push((ord, score));
		}
		matches.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
		debug!(query = query_text, terms = ?terms, hits = matches.len(), "Matched docs index");
		Ok(matches)
	}
}
