// Quarry's Scanner - full rebuild of the content store
//
// Discover → (parallel) read, hash, chunk, analyze → sort by path →
// one transactional replace → scan_summary.json. There is no incremental path:
// every scan rewrites the whole index.

pub mod discovery;

use chrono::Utc;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::{Instant, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::analysis::{AnalyzerRegistry, FileAnalysis};
use crate::chunker::chunk;
use crate::database::{ContentStore, FileEntry, IndexedFile, ScanSummary, Snapshot};
use crate::error::{IoResultExt, QuarryError, Result};
use crate::utils::language::detect_language;
use crate::utils::paths::resolve;
use crate::workspace::{ChunkingConfig, Workspace};

pub use discovery::{Guardrails, discover_files, walkable_file};

/// Blake3 hex digest of raw bytes
pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Blake3 hex digest of a file's raw bytes
pub fn calculate_file_hash(path: &Path) -> Result<String> {
    let bytes = fs::read(path).at(path)?;
    Ok(hash_bytes(&bytes))
}

/// Modification time in whole seconds since the epoch
pub fn mod_time_secs(metadata: &fs::Metadata, path: &Path) -> Result<i64> {
    let modified = metadata.modified().at(path)?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(before_epoch) => -(before_epoch.duration().as_secs() as i64),
    })
}

/// Digest over the path-ordered `path\0hash\n` sequence
///
/// Callers must pass pairs sorted by path; the scanner always does.
pub fn compute_scan_hash<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut hasher = blake3::Hasher::new();
    for (path, hash) in pairs {
        hasher.update(path.as_bytes());
        hasher.update(b"\0");
        hasher.update(hash.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Builds and commits full index snapshots for one workspace
pub struct Scanner {
    workspace: Workspace,
    guardrails: Guardrails,
    analyzers: AnalyzerRegistry,
}

impl Scanner {
    pub fn new(workspace: &Workspace, analyzers: AnalyzerRegistry) -> Result<Self> {
        let guardrails = Guardrails::from_config(&workspace.config.guardrails)?;
        Ok(Self {
            workspace: workspace.clone(),
            guardrails,
            analyzers,
        })
    }

    /// Rebuild the index: replace the store's contents and write `scan_summary.json`
    ///
    /// Any read error aborts before the store is touched. Any write error rolls
    /// the replace back, leaving the previous index intact.
    pub fn scan(&self, store: &mut ContentStore) -> Result<ScanSummary> {
        let start = Instant::now();
        info!("🔍 Scanning workspace: {}", self.workspace.root.display());

        let snapshot = self.build_snapshot()?;
        let summary = store.replace_snapshot(&snapshot)?;
        self.write_summary_artifact(&summary)?;

        info!(
            "✅ Scan complete: {} files, {} chunks, hash {} ({}ms)",
            summary.file_count,
            summary.chunk_count,
            &summary.scan_hash[..12.min(summary.scan_hash.len())],
            start.elapsed().as_millis()
        );
        Ok(summary)
    }

    /// Read, hash, chunk and analyze every indexable file, without writing anything
    pub fn build_snapshot(&self) -> Result<Snapshot> {
        let started_at = Utc::now();
        let indexed_at = started_at.timestamp();
        let root = &self.workspace.root;

        let paths = discover_files(root, &self.guardrails)?;
        info!("📁 Found {} files", paths.len());

        let chunking = &self.workspace.config.chunking;
        let mut files: Vec<IndexedFile> = paths
            .par_iter()
            .map(|relative| self.process_file(root, relative, chunking, indexed_at))
            .collect::<Result<Vec<_>>>()?;

        // Deterministic order regardless of enumeration or thread scheduling
        files.sort_by(|a, b| a.entry.path.cmp(&b.entry.path));

        let scan_hash = compute_scan_hash(
            files
                .iter()
                .map(|f| (f.entry.path.as_str(), f.entry.content_hash.as_str())),
        );

        Ok(Snapshot {
            root: root.to_string_lossy().replace('\\', "/"),
            scan_hash,
            started_at,
            files,
        })
    }

    fn process_file(
        &self,
        root: &Path,
        relative: &str,
        chunking: &ChunkingConfig,
        indexed_at: i64,
    ) -> Result<IndexedFile> {
        let full_path = resolve(root, relative);

        // Metadata before content: a write racing the read leaves a newer
        // modtime on disk, which the staleness check will notice
        let metadata = fs::metadata(&full_path).at(&full_path)?;
        let mod_time = mod_time_secs(&metadata, &full_path)?;
        let bytes = fs::read(&full_path).at(&full_path)?;

        let content_hash = hash_bytes(&bytes);
        let content = String::from_utf8_lossy(&bytes);
        let chunks = chunk(&content, chunking.max_lines, chunking.max_bytes);
        let language = detect_language(Path::new(relative));

        let analysis = match self.analyzers.for_path(Path::new(relative)) {
            Some(analyzer) => analyzer.analyze(relative, &content).unwrap_or_else(|e| {
                warn!(
                    "⚠️  {} analyzer failed on {}: {}",
                    analyzer.language(),
                    relative,
                    e
                );
                FileAnalysis::default()
            }),
            None => FileAnalysis::default(),
        };

        debug!(
            "Processed {}: {} bytes, {} chunks, {} symbols, {} calls",
            relative,
            bytes.len(),
            chunks.len(),
            analysis.symbols.len(),
            analysis.calls.len()
        );

        Ok(IndexedFile {
            entry: FileEntry {
                path: relative.to_string(),
                content_hash,
                size: bytes.len() as u64,
                mod_time,
                indexed_at,
                language: language.map(str::to_string),
            },
            chunks,
            analysis,
        })
    }

    /// Persist the summary next to the index, replacing any previous one
    fn write_summary_artifact(&self, summary: &ScanSummary) -> Result<()> {
        self.workspace.ensure_dir()?;
        let path = self.workspace.scan_summary_path();
        let json = serde_json::to_string_pretty(summary).map_err(|source| {
            QuarryError::Artifact {
                path: path.clone(),
                source,
            }
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).at(&tmp)?;
        fs::rename(&tmp, &path).at(&path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Load the last scan summary artifact, if one was written
pub fn read_summary_artifact(workspace: &Workspace) -> Result<Option<ScanSummary>> {
    let path = workspace.scan_summary_path();
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).at(&path)?;
    let summary = serde_json::from_str(&raw).map_err(|source| QuarryError::Artifact {
        path: path.clone(),
        source,
    })?;
    Ok(Some(summary))
}
