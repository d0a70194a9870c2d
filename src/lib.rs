// Quarry - Deterministic Code Index Library
//!
//! Quarry builds a content-addressable index of a codebase: every file is
//! hashed with Blake3, split into line-aligned chunks and stored in SQLite with
//! an FTS5 index. On top of that index it answers three questions:
//! - is the index still an exact reflection of the working tree ([`staleness`])
//! - which chunks best match a query ([`search`])
//! - who calls what ([`call_graph`])

pub mod analysis;
pub mod call_graph;
pub mod chunker;
pub mod collect;
pub mod database;
pub mod error;
pub mod fuzzy;
pub mod scanner;
pub mod scope;
pub mod search;
pub mod staleness;
pub mod utils;
pub mod workspace;

#[cfg(test)]
pub mod tests;

// Re-export common types
pub use analysis::{Analyzer, AnalyzerRegistry, FileAnalysis, SymbolKind};
pub use database::{ContentStore, ScanSummary};
pub use error::{QuarryError, Result};
pub use scanner::Scanner;
pub use search::{Butler, SearchResponse, TomlManifestDecoder};
pub use staleness::{StaleEntry, StaleReason, VerifyMode, VerifyReport};
pub use workspace::{Workspace, WorkspaceConfig};
