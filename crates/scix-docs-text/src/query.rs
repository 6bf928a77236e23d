//! Matching options and query construction.
//!
//! Every analyzed query term is matched in each weighted field exactly
//! (BM25 scored), as a literal prefix of longer terms, and as a whole term
//! within the fuzzy edit distance. The automaton clauses score a constant.
//! The per-field clauses are multiplied by the field weight.

use serde::{Deserialize, Serialize};
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::Term;

use crate::tantivy_utils::DocFields;

/// Largest distance tantivy builds Levenshtein automata for. Terms of 13 or
/// more chars are therefore tolerated less than the proportional factor says.
pub const MAX_EDIT_DISTANCE: u8 = 2;

/// Per-field score multipliers. A field with a weight of zero or less is not
/// searched at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldBoosts {
    pub title: f32,
    pub section: f32,
    pub subsection: f32,
    pub content: f32,
    pub doc_type: f32,
}

impl FieldBoosts {
    /// Weights of the corpus-wide index.
    pub const GLOBAL: Self = Self { title: 4.0, section: 3.0, subsection: 2.0, content: 1.0, doc_type: 2.0 };

    /// Weights of the per-category index; `doc_type` is not searched there.
    pub const CATEGORY: Self = Self { title: 4.0, section: 2.0, subsection: 1.0, content: 1.0, doc_type: 0.0 };

    fn weighted(&self, fields: &DocFields) -> Vec<(Field, f32)> {
        [
            (fields.title, self.title),
            (fields.section, self.section),
            (fields.subsection, self.subsection),
            (fields.content, self.content),
            (fields.doc_type, self.doc_type),
        ]
        .into_iter()
        .filter(|(_, boost)| *boost > 0.0)
        .collect()
    }
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self::GLOBAL
    }
}

/// How the clauses of several query terms combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// A document matching any term is a hit.
    #[default]
    Or,
    /// Every term has to match in at least one field.
    And,
}

/// Caller overrides for [`MatchOptions`]; `None` keeps the engine default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// Edit distance as a fraction of the term length, or an absolute
    /// distance when 1 or more.
    pub fuzzy: Option<f64>,
    pub prefix: Option<bool>,
    pub boost: Option<FieldBoosts>,
    pub combine_with: Option<Combinator>,
}

/// Fully resolved matching options for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub fuzzy: f64,
    pub prefix: bool,
    pub boosts: FieldBoosts,
    pub combine_with: Combinator,
}

impl MatchOptions {
    pub fn new(fuzzy: f64, boosts: FieldBoosts) -> Self {
        Self { fuzzy, prefix: true, boosts, combine_with: Combinator::Or }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: &SearchOptions) -> Self {
        if let Some(fuzzy) = overrides.fuzzy {
            self.fuzzy = fuzzy;
        }
        if let Some(prefix) = overrides.prefix {
            self.prefix = prefix;
        }
        if let Some(boosts) = overrides.boost {
            self.boosts = boosts;
        }
        if let Some(combine_with) = overrides.combine_with {
            self.combine_with = combine_with;
        }
        self
    }
}

/// Edit distance tolerated for `term`: `round(chars * fuzzy)` for fractional
/// factors, capped at [`MAX_EDIT_DISTANCE`].
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn max_edit_distance(term: &str, fuzzy: f64) -> u8 {
    if !fuzzy.is_finite() || fuzzy <= 0.0 {
        return 0;
    }
    let distance = if fuzzy < 1.0 {
        (term.chars().count() as f64 * fuzzy).round()
    } else {
        fuzzy.floor()
    };
    distance.min(f64::from(MAX_EDIT_DISTANCE)) as u8
}

/// Build the query for already analyzed `terms`, or `None` when nothing can
/// match (no terms, or no searchable field).
pub fn build_query(terms: &[String], fields: &DocFields, options: &MatchOptions) -> Option<Box<dyn Query>> {
    let weighted = options.boosts.weighted(fields);
    let mut term_queries: Vec<Box<dyn Query>> = Vec::new();

    for text in terms {
        let distance = max_edit_distance(text, options.fuzzy);
        let mut per_field: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(weighted.len());
        for &(field, boost) in &weighted {
            let term = Term::from_field_text(field, text);
            let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(
                Occur::Should,
                Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs)) as Box<dyn Query>,
            )];
            if options.prefix {
                clauses.push((Occur::Should, Box::new(FuzzyTermQuery::new_prefix(term.clone(), 0, true)) as Box<dyn Query>));
            }
            if distance > 0 {
                clauses.push((Occur::Should, Box::new(FuzzyTermQuery::new(term, distance, true)) as Box<dyn Query>));
            }
            let field_query = BoostQuery::new(Box::new(BooleanQuery::new(clauses)), boost);
            per_field.push((Occur::Should, Box::new(field_query) as Box<dyn Query>));
        }
        if !per_field.is_empty() {
            term_queries.push(Box::new(BooleanQuery::new(per_field)));
        }
    }

    if term_queries.is_empty() {
        return None;
    }
    let occur = match options.combine_with {
        Combinator::Or => Occur::Should,
        Combinator::And => Occur::Must,
    };
    let query = BooleanQuery::new(term_queries.into_iter().map(|q| (occur, q)).collect());
    Some(Box::new(query))
}

/// Coerce a caller supplied limit: missing or non-finite values fall back to
/// `default`, everything else is floored and kept at 1 or more.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_limit(limit: Option<f64>, default: usize) -> usize {
    match limit {
        Some(limit) if limit.is_finite() => limit.floor().max(1.0) as usize,
        _ => default.max(1),
    }
}

/// Drop matches scoring below `cutoff` times the best score. `matches` must be
/// sorted by descending score; nothing is dropped when the best score is 0.
pub fn apply_score_cutoff(matches: &mut Vec<(usize, f32)>, cutoff: f32) {
    let Some(&(_, top_score)) = matches.first() else { return };
    if top_score > 0.0 {
        let threshold = top_score * cutoff;
        matches.retain(|&(_, score)| score >= threshold);
    }
}
