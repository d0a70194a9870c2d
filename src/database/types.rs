// Database type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{FileAnalysis, SymbolKind};
use crate::chunker::ChunkSpan;

/// File tracking information with Blake3 hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content_hash: String, // Blake3 hash of raw bytes
    pub size: u64,
    pub mod_time: i64,   // Unix timestamp, whole seconds
    pub indexed_at: i64, // Unix timestamp
    pub language: Option<String>,
}

/// The (hash, size, modtime) triple the staleness detector compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFileMeta {
    pub content_hash: String,
    pub size: u64,
    pub mod_time: i64,
}

/// A chunk row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub path: String,
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

/// A full-text match with its raw FTS5 bm25 rank (more negative = better)
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit {
    pub path: String,
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub snippet: String,
    pub rank: f64,
}

/// One completed scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub id: i64,
    pub root: String,
    pub scan_hash: String,
    pub file_count: usize,
    pub chunk_count: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// A stored symbol definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSymbol {
    pub path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub line_start: usize,
    pub line_end: usize,
}

/// A stored call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCall {
    pub path: String,
    pub line: usize,
    pub target: String,
}

/// A file fully processed by the scanner, ready for the transactional replace
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub entry: FileEntry,
    pub chunks: Vec<ChunkSpan>,
    pub analysis: FileAnalysis,
}

/// Complete replacement contents for the store, sorted by path
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: String,
    pub scan_hash: String,
    pub started_at: DateTime<Utc>,
    pub files: Vec<IndexedFile>,
}

/// Row counts for health reporting
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_files: i64,
    pub total_chunks: i64,
    pub total_symbols: i64,
    pub total_calls: i64,
    pub total_scans: i64,
}
