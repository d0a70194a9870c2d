//! Post-retrieval re-ranking.
//!
//! Each boost is a named multiplier applied to the negated bm25 score. The
//! pipeline runs in a fixed order and boosts compound:
//! 1. entry point of a curated room: 3.0x
//! 2. path contains the whole query: 2.5x, else a query word: 1.5x
//! 3. source-code extension: 1.2x

use crate::utils::language::is_source_extension;

pub const ENTRY_POINT_BOOST: f64 = 3.0;
pub const PATH_QUERY_BOOST: f64 = 2.5;
pub const PATH_WORD_BOOST: f64 = 1.5;
pub const SOURCE_EXTENSION_BOOST: f64 = 1.2;

/// What a boost gets to look at for one result
#[derive(Debug, Clone, Copy)]
pub struct BoostInput<'a> {
    pub path: &'a str,
    pub is_entry: bool,
    /// Trimmed, lowercased query
    pub query: &'a str,
    /// Lowercased query words longer than two characters
    pub words: &'a [String],
}

/// One named re-ranking heuristic
pub trait Boost: Send + Sync {
    fn name(&self) -> &'static str;

    /// Multiplier for this result, or `None` when the boost does not apply
    fn factor(&self, input: &BoostInput<'_>) -> Option<f64>;
}

pub struct EntryPointBoost;

impl Boost for EntryPointBoost {
    fn name(&self) -> &'static str {
        "entry_point"
    }

    fn factor(&self, input: &BoostInput<'_>) -> Option<f64> {
        input.is_entry.then_some(ENTRY_POINT_BOOST)
    }
}

pub struct PathMatchBoost;

impl Boost for PathMatchBoost {
    fn name(&self) -> &'static str {
        "path_match"
    }

    fn factor(&self, input: &BoostInput<'_>) -> Option<f64> {
        let path = input.path.to_lowercase();
        if !input.query.is_empty() && path.contains(input.query) {
            Some(PATH_QUERY_BOOST)
        } else if input.words.iter().any(|word| path.contains(word.as_str())) {
            Some(PATH_WORD_BOOST)
        } else {
            None
        }
    }
}

pub struct SourceExtensionBoost;

impl Boost for SourceExtensionBoost {
    fn name(&self) -> &'static str {
        "source_extension"
    }

    fn factor(&self, input: &BoostInput<'_>) -> Option<f64> {
        is_source_extension(input.path).then_some(SOURCE_EXTENSION_BOOST)
    }
}

/// The ordered boost pipeline used by search
pub struct BoostPipeline {
    boosts: Vec<Box<dyn Boost>>,
}

impl Default for BoostPipeline {
    fn default() -> Self {
        Self {
            boosts: vec![
                Box::new(EntryPointBoost),
                Box::new(PathMatchBoost),
                Box::new(SourceExtensionBoost),
            ],
        }
    }
}

impl BoostPipeline {
    /// Multiply `base` by every applicable boost, returning the score and the
    /// names of the boosts that fired, in pipeline order
    pub fn apply(&self, base: f64, input: &BoostInput<'_>) -> (f64, Vec<&'static str>) {
        let mut score = base;
        let mut applied = Vec::new();
        for boost in &self.boosts {
            if let Some(factor) = boost.factor(input) {
                score *= factor;
                applied.push(boost.name());
            }
        }
        (score, applied)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.boosts.iter().map(|b| b.name()).collect()
    }
}
