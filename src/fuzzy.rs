//! Edit-distance helpers for typo-tolerant lookups
//!
//! Used to suggest room names for an unknown room filter and symbol names
//! for a call-graph lookup that found no definition.

/// Levenshtein distance over Unicode code points, ignoring case
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row DP: previous[j] is the distance between a[..i] and b[..j]
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let insertion = current[j] + 1;
            let deletion = previous[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Similarity in `[0, 1]`: `1 - distance / max(len)`, 1.0 for two empty strings
pub fn fuzzy_score(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let score = 1.0 - edit_distance(a, b) as f64 / longest as f64;
    score.clamp(0.0, 1.0)
}

/// How many edits a word of this length may tolerate before a match is noise
pub fn recommended_max_distance(word: &str) -> usize {
    match word.chars().count() {
        0..=3 => 0,
        4..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}

/// A candidate within tolerance of the search term
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub candidate: String,
    pub distance: usize,
    pub score: f64,
}

/// Candidates within `max_distance` of `term`, closest first
///
/// Ordered by distance ascending then score descending; the insertion sort is
/// stable so ties keep their input order.
pub fn suggest_matches<I, S>(term: &str, candidates: I, max_distance: usize) -> Vec<FuzzyMatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut matches: Vec<FuzzyMatch> = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = edit_distance(term, candidate);
        if distance > max_distance {
            continue;
        }

        let entry = FuzzyMatch {
            candidate: candidate.to_string(),
            distance,
            score: fuzzy_score(term, candidate),
        };

        // Insert after every element that sorts before or equal to the new one
        let position = matches
            .iter()
            .position(|existing| {
                entry.distance < existing.distance
                    || (entry.distance == existing.distance && entry.score > existing.score)
            })
            .unwrap_or(matches.len());
        matches.insert(position, entry);
    }

    matches
}

/// Just the candidate names, using the length-based tolerance for `term`
pub fn suggestions<I, S>(term: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    suggest_matches(term, candidates, recommended_max_distance(term))
        .into_iter()
        .map(|m| m.candidate)
        .collect()
}
