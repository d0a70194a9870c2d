//! Structural analysis collaborator
//!
//! Per-language parsers live outside this crate. The scanner only sees them
//! through the [`Analyzer`] trait: given a file's path and text, produce the
//! symbols it defines and the calls it makes. Analyzers are registered by
//! language tag in an [`AnalyzerRegistry`] built once at startup and handed to
//! the scanner explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::utils::language::detect_language;

/// Kind of a defined symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Constructor,
    Class,
    Struct,
    Interface,
    Type,
    Other,
}

impl SymbolKind {
    /// Convert from string representation (for database deserialization)
    pub fn from_string(s: &str) -> Self {
        match s {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "constructor" => SymbolKind::Constructor,
            "class" => SymbolKind::Class,
            "struct" => SymbolKind::Struct,
            "interface" => SymbolKind::Interface,
            "type" => SymbolKind::Type,
            _ => SymbolKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Other => "other",
        }
    }
}

/// A symbol defined in a file, with its 1-based inclusive line range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub name: String,
    pub kind: SymbolKind,
    pub line_start: usize,
    pub line_end: usize,
}

/// A call made from a file; `target` may be qualified (`auth.Validate`, `crate::auth::validate`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRef {
    pub target: String,
    pub line: usize,
}

/// Everything an analyzer reports for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub symbols: Vec<SymbolDef>,
    pub calls: Vec<CallRef>,
}

/// A per-language structural parser
pub trait Analyzer: Send + Sync {
    /// Language tag this analyzer handles (e.g. "go", "rust")
    fn language(&self) -> &str;

    /// Analyze one file. `path` is workspace-relative and slash-normalized.
    fn analyze(&self, path: &str, content: &str) -> anyhow::Result<FileAnalysis>;
}

/// Registration table of analyzers keyed by language tag
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: HashMap<String, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an analyzer under its own language tag, replacing any previous one
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers
            .insert(analyzer.language().to_string(), analyzer);
    }

    pub fn with(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.register(analyzer);
        self
    }

    pub fn get(&self, language: &str) -> Option<&Arc<dyn Analyzer>> {
        self.analyzers.get(language)
    }

    /// Analyzer for a file, chosen by its extension
    pub fn for_path(&self, path: &Path) -> Option<&Arc<dyn Analyzer>> {
        detect_language(path).and_then(|language| self.get(language))
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.analyzers.keys().map(|k| k.as_str()).collect();
        languages.sort_unstable();
        languages
    }
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
