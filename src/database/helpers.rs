// Helper functions and utilities

use super::*;
use rusqlite::OptionalExtension;

use crate::analysis::SymbolKind;

/// Standard SELECT column list for symbol queries
/// Must stay in sync with row_to_symbol()
pub(crate) const SYMBOL_COLUMNS: &str = "path, name, kind, line_start, line_end";

/// Standard SELECT column list for call queries, in row_to_call() order
pub(crate) const CALL_COLUMNS: &str = "path, line, target";

impl ContentStore {
    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &'static str| -> Result<i64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .during("count rows")
        };

        Ok(StoreStats {
            total_files: count("files")?,
            total_chunks: count("chunks")?,
            total_symbols: count("symbols")?,
            total_calls: count("calls")?,
            total_scans: count("scan_summaries")?,
        })
    }

    /// The authoritative scan: the summary row with the highest id
    pub fn latest_scan(&self) -> Result<Option<ScanSummary>> {
        self.conn
            .query_row(
                "SELECT id, root, scan_hash, file_count, chunk_count, started_at, completed_at
                 FROM scan_summaries ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(ScanSummary {
                        id: row.get(0)?,
                        root: row.get(1)?,
                        scan_hash: row.get(2)?,
                        file_count: row.get::<_, i64>(3)? as usize,
                        chunk_count: row.get::<_, i64>(4)? as usize,
                        started_at: row.get(5)?,
                        completed_at: row.get(6)?,
                    })
                },
            )
            .optional()
            .during("load latest scan")
    }

    /// Helper to convert a row to a StoredSymbol
    pub(crate) fn row_to_symbol(row: &rusqlite::Row) -> rusqlite::Result<StoredSymbol> {
        let kind: String = row.get("kind")?;
        Ok(StoredSymbol {
            path: row.get("path")?,
            name: row.get("name")?,
            kind: SymbolKind::from_string(&kind),
            line_start: row.get::<_, i64>("line_start")? as usize,
            line_end: row.get::<_, i64>("line_end")? as usize,
        })
    }

    pub(crate) fn row_to_call(row: &rusqlite::Row) -> rusqlite::Result<StoredCall> {
        Ok(StoredCall {
            path: row.get("path")?,
            line: row.get::<_, i64>("line")? as usize,
            target: row.get("target")?,
        })
    }
}
