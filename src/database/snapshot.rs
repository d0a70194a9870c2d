// Transactional snapshot replacement - the store's only write path

use super::*;
use chrono::Utc;
use rusqlite::params;
use tracing::{debug, info};

use crate::search::tokenizer::identifier_terms;

impl ContentStore {
    /// Atomically replace every file, chunk, symbol, call and full-text row with
    /// `snapshot`, then record a new scan summary.
    ///
    /// Runs in one transaction: on any error nothing is committed and readers
    /// keep seeing the previous index.
    pub fn replace_snapshot(&mut self, snapshot: &Snapshot) -> Result<ScanSummary> {
        let start_time = std::time::Instant::now();
        info!(
            "🔐 Replacing index contents with {} files",
            snapshot.files.len()
        );

        let tx = self.conn.transaction().during("begin replace")?;

        // STEP 1: Clear the previous snapshot
        tx.execute("INSERT INTO chunks_fts(chunks_fts) VALUES('delete-all')", [])
            .during("clear full-text index")?;
        tx.execute("DELETE FROM calls", []).during("clear calls")?;
        tx.execute("DELETE FROM symbols", []).during("clear symbols")?;
        tx.execute("DELETE FROM chunks", []).during("clear chunks")?;
        tx.execute("DELETE FROM files", []).during("clear files")?;

        // STEP 2: Insert the new snapshot
        let mut chunk_count = 0usize;
        {
            let mut file_stmt = tx
                .prepare(
                    "INSERT INTO files (path, content_hash, size, mod_time, indexed_at, language)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .during("prepare file insert")?;
            let mut chunk_stmt = tx
                .prepare(
                    "INSERT INTO chunks (path, chunk_index, start_line, end_line, content, terms)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .during("prepare chunk insert")?;
            let mut fts_stmt = tx
                .prepare("INSERT INTO chunks_fts(rowid, content, terms) VALUES (?1, ?2, ?3)")
                .during("prepare full-text insert")?;
            let mut symbol_stmt = tx
                .prepare(
                    "INSERT INTO symbols (path, name, kind, line_start, line_end)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .during("prepare symbol insert")?;
            let mut call_stmt = tx
                .prepare("INSERT INTO calls (path, line, target) VALUES (?1, ?2, ?3)")
                .during("prepare call insert")?;

            for file in &snapshot.files {
                let entry = &file.entry;
                file_stmt
                    .execute(params![
                        entry.path,
                        entry.content_hash,
                        entry.size as i64,
                        entry.mod_time,
                        entry.indexed_at,
                        entry.language,
                    ])
                    .during("insert file")?;

                for chunk in &file.chunks {
                    let terms = identifier_terms(&chunk.content);
                    chunk_stmt
                        .execute(params![
                            entry.path,
                            chunk.chunk_index as i64,
                            chunk.start_line as i64,
                            chunk.end_line as i64,
                            chunk.content,
                            terms,
                        ])
                        .during("insert chunk")?;
                    let rowid = tx.last_insert_rowid();
                    fts_stmt
                        .execute(params![rowid, chunk.content, terms])
                        .during("insert full-text row")?;
                    chunk_count += 1;
                }

                for symbol in &file.analysis.symbols {
                    symbol_stmt
                        .execute(params![
                            entry.path,
                            symbol.name,
                            symbol.kind.as_str(),
                            symbol.line_start as i64,
                            symbol.line_end as i64,
                        ])
                        .during("insert symbol")?;
                }

                for call in &file.analysis.calls {
                    call_stmt
                        .execute(params![entry.path, call.line as i64, call.target])
                        .during("insert call")?;
                }
            }
        }

        // STEP 3: Record the scan
        let completed_at = Utc::now();
        tx.execute(
            "INSERT INTO scan_summaries (root, scan_hash, file_count, chunk_count, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                snapshot.root,
                snapshot.scan_hash,
                snapshot.files.len() as i64,
                chunk_count as i64,
                snapshot.started_at,
                completed_at,
            ],
        )
        .during("insert scan summary")?;
        let id = tx.last_insert_rowid();

        debug!("💾 Committing snapshot replace");
        tx.commit().during("commit replace")?;

        info!(
            "✅ Index replaced: {} files, {} chunks in {}ms",
            snapshot.files.len(),
            chunk_count,
            start_time.elapsed().as_millis()
        );

        Ok(ScanSummary {
            id,
            root: snapshot.root.clone(),
            scan_hash: snapshot.scan_hash.clone(),
            file_count: snapshot.files.len(),
            chunk_count,
            started_at: snapshot.started_at,
            completed_at,
        })
    }
}
