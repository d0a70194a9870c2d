// File table queries

use super::*;
use rusqlite::{OptionalExtension, params};
use tracing::debug;
use std::collections::BTreeMap;

impl ContentStore {
    /// Stored (hash, size, modtime) for every indexed path, keyed and ordered by path
    pub fn file_metadata(&self) -> Result<BTreeMap<String, StoredFileMeta>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, content_hash, size, mod_time FROM files")
            .during("prepare file metadata")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    StoredFileMeta {
                        content_hash: row.get(1)?,
                        size: row.get::<_, i64>(2)? as u64,
                        mod_time: row.get(3)?,
                    },
                ))
            })
            .during("query file metadata")?;

        let mut metadata = BTreeMap::new();
        for row in rows {
            let (path, meta) = row.during("read file metadata")?;
            metadata.insert(path, meta);
        }

        debug!("Loaded metadata for {} stored files", metadata.len());
        Ok(metadata)
    }

    /// All indexed paths in lexicographic order
    pub fn indexed_paths(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM files ORDER BY path")
            .during("prepare indexed paths")?;

        let paths = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .during("query indexed paths")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read indexed paths")?;

        Ok(paths)
    }

    pub fn get_file(&self, path: &str) -> Result<Option<FileEntry>> {
        self.conn
            .query_row(
                "SELECT path, content_hash, size, mod_time, indexed_at, language
                 FROM files WHERE path = ?1",
                params![path],
                |row| {
                    Ok(FileEntry {
                        path: row.get(0)?,
                        content_hash: row.get(1)?,
                        size: row.get::<_, i64>(2)? as u64,
                        mod_time: row.get(3)?,
                        indexed_at: row.get(4)?,
                        language: row.get(5)?,
                    })
                },
            )
            .optional()
            .during("get file")
    }
}
