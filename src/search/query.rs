//! Query classification and FTS5 query building.
//!
//! A query carrying identifier or path punctuation is searched as one exact
//! phrase. Anything else is treated as natural language: each meaningful
//! token becomes a prefix term and the terms are OR-ed together.

use serde::Serialize;

/// How a query was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Contains `.`, `_`, `::`, `->` or brackets; matched as an exact phrase
    Code,
    /// Free text; matched as OR-ed prefix terms
    NaturalLanguage,
}

/// A query ready to run against `chunks_fts`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    pub kind: QueryKind,
    /// FTS5 MATCH expression
    pub fts: String,
    /// Trimmed, lowercased query text (for whole-query path matching)
    pub normalized: String,
    /// Lowercased query words longer than two characters (for per-word path matching)
    pub words: Vec<String>,
}

/// Detect identifier/path punctuation
pub fn classify(query: &str) -> QueryKind {
    let code_like = query.contains('.')
        || query.contains('_')
        || query.contains("::")
        || query.contains("->")
        || query.chars().any(|c| matches!(c, '(' | ')' | '[' | ']' | '{' | '}'));

    if code_like {
        QueryKind::Code
    } else {
        QueryKind::NaturalLanguage
    }
}

/// Build the FTS5 expression for `query`; `None` when the query is blank
pub fn prepare(query: &str) -> Option<PreparedQuery> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }

    let kind = classify(trimmed);
    let fts = match kind {
        QueryKind::Code => phrase(trimmed),
        QueryKind::NaturalLanguage => {
            let terms: Vec<String> = trimmed
                .split_whitespace()
                .filter(|token| is_meaningful_token(token))
                .map(|token| format!("{}*", phrase(token)))
                .collect();

            if terms.is_empty() {
                phrase(trimmed)
            } else {
                terms.join(" OR ")
            }
        }
    };

    let words = trimmed
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(|word| word.to_lowercase())
        .collect();

    Some(PreparedQuery {
        kind,
        fts,
        normalized: trimmed.to_lowercase(),
        words,
    })
}

/// Tokens shorter than two characters or made only of punctuation are noise
fn is_meaningful_token(token: &str) -> bool {
    token.chars().count() >= 2 && token.chars().any(|c| c.is_alphanumeric())
}

/// Quote `text` as an FTS5 string, doubling embedded quotes
fn phrase(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
