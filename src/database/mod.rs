//! Quarry's Content Store - SQLite source of truth
//!
//! Holds the file table (path → hash, size, modtime), the chunk table, the
//! FTS5 index over chunk text, extracted symbols and call sites, and one
//! summary row per completed scan. The scanner's transactional replace in
//! [`ContentStore::replace_snapshot`] is the only write path; everything else
//! here is read-only.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, StoreResultExt};

mod chunks;
mod files;
mod helpers;
mod schema;
mod snapshot;
mod symbols;
pub mod types;

pub use types::*;

/// The content store connection
pub struct ContentStore {
    pub(crate) conn: Connection,
    pub(crate) file_path: PathBuf,
}

impl ContentStore {
    /// Open (or create) the store at `db_path` and initialize the schema
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let file_path = db_path.as_ref().to_path_buf();

        debug!("Opening content store at: {}", file_path.display());

        let conn = Connection::open(&file_path).during("open database")?;

        // Readers may run while a scan holds the write lock
        conn.busy_timeout(std::time::Duration::from_millis(5000))
            .during("set busy timeout")?;

        // WAL lets readers see the pre-scan snapshot until the replace commits
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .during("enable WAL")?;

        let mut store = Self { conn, file_path };
        store.initialize_schema()?;

        info!("Content store ready: {}", store.file_path.display());
        Ok(store)
    }

    /// In-memory store for tests and throwaway indexes
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().during("open in-memory database")?;
        let mut store = Self {
            conn,
            file_path: PathBuf::from(":memory:"),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
