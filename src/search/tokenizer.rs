//! Code-aware term extraction for the full-text `terms` column.
//!
//! The FTS5 `unicode61` tokenizer already splits on `_`, but it keeps
//! `ValidatePassword` as one token. Splitting identifiers here means a prefix
//! query like `"password"*` finds the chunk that defines `ValidatePassword`.

use std::collections::HashSet;

/// Lowercased identifier parts of `text`, space-separated, first-seen order, no duplicates.
///
/// Only identifiers that actually split (CamelCase or snake_case) contribute;
/// plain words are already indexed through the content column.
pub fn identifier_terms(text: &str) -> String {
    let mut emitted: HashSet<String> = HashSet::new();
    let mut terms: Vec<String> = Vec::new();

    for segment in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if segment.is_empty() {
            continue;
        }

        let is_camel = segment.chars().any(|c| c.is_uppercase())
            && segment.chars().any(|c| c.is_lowercase());
        let is_snake = segment.contains('_');
        if !is_camel && !is_snake {
            continue;
        }

        for snake_part in split_snake_case(segment) {
            for part in split_camel_case(snake_part) {
                let lower = part.to_lowercase();
                if emitted.insert(lower.clone()) {
                    terms.push(lower);
                }
            }
        }
    }

    terms.join(" ")
}

/// Split a CamelCase or PascalCase identifier into words.
///
/// Handles transitions like:
/// - `UserService` -> `["User", "Service"]`
/// - `XMLParser` -> `["XML", "Parser"]`
/// - `getHTTPResponse` -> `["get", "HTTP", "Response"]`
pub fn split_camel_case(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let indices: Vec<(usize, char)> = s.char_indices().collect();
    let mut start = 0;

    for i in 1..indices.len() {
        let prev = indices[i - 1].1;
        let curr = indices[i].1;
        let split_before_upper = prev.is_lowercase() && curr.is_uppercase();
        let split_acronym = i >= 2
            && indices[i - 2].1.is_uppercase()
            && prev.is_uppercase()
            && curr.is_lowercase();

        if split_before_upper || split_acronym {
            let split_at = if split_acronym { i - 1 } else { i };
            let byte_at = indices[split_at].0;
            if byte_at > start {
                result.push(&s[start..byte_at]);
                start = byte_at;
            }
        }
    }

    if start < s.len() {
        result.push(&s[start..]);
    }

    result
}

/// Split a snake_case or SCREAMING_SNAKE_CASE identifier into words.
pub fn split_snake_case(s: &str) -> Vec<&str> {
    s.split('_').filter(|part| !part.is_empty()).collect()
}
