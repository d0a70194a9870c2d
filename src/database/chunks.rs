// Chunk retrieval and full-text search

use super::*;
use rusqlite::params;
use tracing::debug;

use crate::error::QuarryError;

impl ContentStore {
    /// Run an FTS5 MATCH expression over chunk text
    ///
    /// Hits come back best-first by bm25 rank, ties broken by path and chunk
    /// index so equal scores order the same way every time. A malformed match
    /// expression surfaces as [`QuarryError::Query`].
    pub fn search_chunks(&self, fts_query: &str, limit: usize) -> Result<Vec<ChunkHit>> {
        debug!("FTS5 match '{}' (limit {})", fts_query, limit);

        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.path, c.chunk_index, c.start_line, c.end_line,
                        snippet(chunks_fts, 0, '', '', '…', 24),
                        bm25(chunks_fts) AS rank
                 FROM chunks_fts
                 JOIN chunks c ON c.id = chunks_fts.rowid
                 WHERE chunks_fts MATCH ?1
                 ORDER BY rank, c.path, c.chunk_index
                 LIMIT ?2",
            )
            .during("prepare chunk search")?;

        let hits = stmt
            .query_map(params![fts_query, limit as i64], |row| {
                Ok(ChunkHit {
                    path: row.get(0)?,
                    chunk_index: row.get::<_, i64>(1)? as usize,
                    start_line: row.get::<_, i64>(2)? as usize,
                    end_line: row.get::<_, i64>(3)? as usize,
                    snippet: row.get(4)?,
                    rank: row.get(5)?,
                })
            })
            .map_err(QuarryError::Query)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(QuarryError::Query)?;

        debug!("FTS5 returned {} hits", hits.len());
        Ok(hits)
    }

    /// Every chunk of one file, in chunk order
    pub fn chunks_for_path(&self, path: &str) -> Result<Vec<StoredChunk>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT path, chunk_index, start_line, end_line, content
                 FROM chunks WHERE path = ?1
                 ORDER BY chunk_index",
            )
            .during("prepare chunks for path")?;

        let chunks = stmt
            .query_map(params![path], |row| {
                Ok(StoredChunk {
                    path: row.get(0)?,
                    chunk_index: row.get::<_, i64>(1)? as usize,
                    start_line: row.get::<_, i64>(2)? as usize,
                    end_line: row.get::<_, i64>(3)? as usize,
                    content: row.get(4)?,
                })
            })
            .during("query chunks for path")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read chunks for path")?;

        Ok(chunks)
    }
}
