use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::staleness::StaleEntry;

#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Search query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Cannot resolve diff range '{range}': {reason}")]
    ScopeUnresolved { range: String, reason: String },

    #[error("Index is stale: {} path(s) drifted since the last scan", .0.len())]
    StaleIndex(Vec<StaleEntry>),

    #[error("No scan recorded for {}; run `quarry scan` first", root.display())]
    NotIndexed { root: PathBuf },

    #[error("Unknown symbol '{symbol}'")]
    UnknownSymbol {
        symbol: String,
        suggestions: Vec<String>,
    },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Rooms manifest error: {0}")]
    Manifest(String),

    #[error("Artifact {} could not be encoded or decoded: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, QuarryError>;

/// Attach the operation name to raw SQLite failures.
pub trait StoreResultExt<T> {
    fn during(self, operation: &'static str) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn during(self, operation: &'static str) -> Result<T> {
        self.map_err(|source| QuarryError::Store { operation, source })
    }
}

/// Attach the offending path to raw I/O failures.
pub trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| QuarryError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
