use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

pub const TOKENIZER_NAME: &str = "docs_simple";

/// Handles of the fields of the docs schema.
#[derive(Debug, Clone, Copy)]
pub struct DocFields {
	pub ord: Field,
	pub title: Field,
	pub section: Field,
	pub subsection: Field,
	pub content: Field,
	pub doc_type: Field,
	pub category: Field,
}

pub fn build_schema() -> (Schema, DocFields) {
	let mut schema_builder = Schema::builder();
	let text_field_indexing = TextFieldIndexing::default()
		.set_tokenizer(TOKENIZER_NAME)
		.set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let fields = DocFields {
		ord: schema_builder.add_u64_field("ord", STORED),
		title: schema_builder.add_text_field("title", text_options.clone()),
		section: schema_builder.add_text_field("section", text_options.clone()),
		subsection: schema_builder.add_text_field("subsection", text_options.clone()),
		content: schema_builder.add_text_field("content", text_options.clone()),
		doc_type: schema_builder.add_text_field("doc_type", text_options),
		category: schema_builder.add_text_field("category", STRING),
	};
	(schema_builder.build(), fields)
}

pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(40))
		.filter(LowerCaser)
		.build()
}

pub fn register_tokenizer(index: &Index) {
	index.tokenizers().register(TOKENIZER_NAME, build_analyzer());
}
