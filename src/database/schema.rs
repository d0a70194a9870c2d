// Database schema initialization and table creation

use super::*;
use tracing::debug;

impl ContentStore {
    /// Initialize the complete database schema
    pub(super) fn initialize_schema(&mut self) -> Result<()> {
        debug!("Creating database schema");

        // Chunks, symbols and calls cascade from their file row
        self.conn
            .execute("PRAGMA foreign_keys = ON", [])
            .during("enable foreign keys")?;

        // Create tables in dependency order
        self.create_files_table()?;
        self.create_chunks_table()?;
        self.create_chunks_fts_table()?;
        self.create_symbols_table()?;
        self.create_calls_table()?;
        self.create_scan_summaries_table()?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// One row per indexed file, keyed by workspace-relative path
    pub(crate) fn create_files_table(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS files (
                    path TEXT PRIMARY KEY,
                    content_hash TEXT NOT NULL,
                    size INTEGER NOT NULL,
                    mod_time INTEGER NOT NULL,   -- whole seconds since epoch
                    indexed_at INTEGER NOT NULL,
                    language TEXT
                )",
                [],
            )
            .during("create files table")?;

        debug!("Created files table");
        Ok(())
    }

    /// Line-aligned chunks; (path, chunk_index) is unique and ranges are contiguous per path
    pub(crate) fn create_chunks_table(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS chunks (
                    id INTEGER PRIMARY KEY,
                    path TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
                    chunk_index INTEGER NOT NULL,
                    start_line INTEGER NOT NULL,
                    end_line INTEGER NOT NULL,
                    content TEXT NOT NULL,
                    terms TEXT NOT NULL DEFAULT '',  -- identifier parts for the FTS terms column
                    UNIQUE(path, chunk_index)
                )",
                [],
            )
            .during("create chunks table")?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_chunks_path ON chunks(path)",
                [],
            )
            .during("create chunks index")?;

        debug!("Created chunks table and indexes");
        Ok(())
    }

    /// Full-text index over chunk content, external-content backed by `chunks`
    ///
    /// No sync triggers: the scan's replace clears and refills it in the same
    /// transaction that rewrites `chunks`.
    pub(crate) fn create_chunks_fts_table(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
                    content,
                    terms,
                    content='chunks',
                    content_rowid='id',
                    tokenize='unicode61 remove_diacritics 2'
                )",
                [],
            )
            .during("create chunks_fts table")?;

        debug!("Created chunks_fts virtual table");
        Ok(())
    }

    /// Symbols reported by analyzers
    pub(crate) fn create_symbols_table(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS symbols (
                    id INTEGER PRIMARY KEY,
                    path TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    line_start INTEGER NOT NULL,
                    line_end INTEGER NOT NULL
                )",
                [],
            )
            .during("create symbols table")?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name)",
                [],
            )
            .during("create symbols name index")?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_symbols_path ON symbols(path)",
                [],
            )
            .during("create symbols path index")?;

        debug!("Created symbols table and indexes");
        Ok(())
    }

    /// Call sites reported by analyzers (source file + line → target name)
    pub(crate) fn create_calls_table(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS calls (
                    id INTEGER PRIMARY KEY,
                    path TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
                    line INTEGER NOT NULL,
                    target TEXT NOT NULL
                )",
                [],
            )
            .during("create calls table")?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_calls_target ON calls(target)",
                [],
            )
            .during("create calls target index")?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_calls_path ON calls(path, line)",
                [],
            )
            .during("create calls path index")?;

        debug!("Created calls table and indexes");
        Ok(())
    }

    /// One row per completed scan; the highest id is authoritative
    pub(crate) fn create_scan_summaries_table(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS scan_summaries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    root TEXT NOT NULL,
                    scan_hash TEXT NOT NULL,
                    file_count INTEGER NOT NULL,
                    chunk_count INTEGER NOT NULL,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL
                )",
                [],
            )
            .during("create scan_summaries table")?;

        debug!("Created scan_summaries table");
        Ok(())
    }
}
