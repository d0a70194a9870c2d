//! Staleness detection
//!
//! Compares the working tree against the metadata recorded by the last scan.
//! Fast mode trusts an exact (size, modtime) match and only hashes on a
//! mismatch; strict mode hashes every candidate. Findings are data, not
//! errors: every candidate is checked before the report is returned, and the
//! store is never written.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::database::{ContentStore, StoredFileMeta};
use crate::error::{QuarryError, Result};
use crate::scanner::{Guardrails, calculate_file_hash, mod_time_secs, walkable_file};
use crate::scope::{DiffProvider, Scope, ScopeKind, resolve_scope};
use crate::utils::paths::resolve;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Size + modtime shortcut, hashing only on mismatch
    #[default]
    Fast,
    /// Always hash
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    /// On disk, not in the index
    New,
    /// In the index, gone from disk
    Missing,
    /// Content hash differs from the indexed one
    Changed,
    /// Could not be read to decide
    ErrorReading(String),
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleReason::New => write!(f, "new"),
            StaleReason::Missing => write!(f, "missing"),
            StaleReason::Changed => write!(f, "changed"),
            StaleReason::ErrorReading(e) => write!(f, "error reading: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleEntry {
    pub path: String,
    pub reason: StaleReason,
}

/// Outcome of a verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub scope: ScopeKind,
    pub diff_range: Option<String>,
    pub mode: VerifyMode,
    pub candidate_count: usize,
    /// Sorted by path, one entry per path
    pub stale: Vec<StaleEntry>,
}

impl VerifyReport {
    pub fn is_fresh(&self) -> bool {
        self.stale.is_empty()
    }
}

/// Compare `candidates` against `stored`
///
/// With `include_missing`, stored paths that are not candidates (and not
/// excluded by `guardrails`) are reported missing too; only a full-scope run
/// should ask for that.
pub fn detect(
    root: &Path,
    candidates: &[String],
    stored: &BTreeMap<String, StoredFileMeta>,
    mode: VerifyMode,
    include_missing: bool,
    guardrails: &Guardrails,
) -> Vec<StaleEntry> {
    let mut stale: Vec<StaleEntry> = candidates
        .par_iter()
        .filter_map(|path| {
            check_path(root, path, stored.get(path), mode).map(|reason| StaleEntry {
                path: path.clone(),
                reason,
            })
        })
        .collect();

    if include_missing {
        let candidate_set: HashSet<&str> = candidates.iter().map(String::as_str).collect();
        stale.extend(
            stored
                .keys()
                .filter(|path| !candidate_set.contains(path.as_str()))
                .filter(|path| guardrails.is_indexable(path))
                .map(|path| StaleEntry {
                    path: path.clone(),
                    reason: StaleReason::Missing,
                }),
        );
    }

    stale.sort_by(|a, b| a.path.cmp(&b.path));
    stale.dedup_by(|a, b| a.path == b.path);
    stale
}

/// Decide one path; `None` means it matches the index
///
/// A symlink, or anything else the scan walk would skip, counts as absent.
fn check_path(
    root: &Path,
    relative: &str,
    stored: Option<&StoredFileMeta>,
    mode: VerifyMode,
) -> Option<StaleReason> {
    let full_path = resolve(root, relative);

    let metadata = match walkable_file(root, relative) {
        Ok(metadata) => metadata,
        Err(e) => return Some(StaleReason::ErrorReading(e.to_string())),
    };

    let (metadata, stored) = match (metadata, stored) {
        (None, None) => return None,
        (Some(_), None) => return Some(StaleReason::New),
        (None, Some(_)) => return Some(StaleReason::Missing),
        (Some(metadata), Some(stored)) => (metadata, stored),
    };

    if mode == VerifyMode::Fast {
        let mod_time = match mod_time_secs(&metadata, &full_path) {
            Ok(mod_time) => mod_time,
            Err(e) => return Some(StaleReason::ErrorReading(e.to_string())),
        };
        if metadata.len() == stored.size && mod_time == stored.mod_time {
            return None;
        }
        debug!("{}: size/modtime drifted, hashing", relative);
    }

    match calculate_file_hash(&full_path) {
        Ok(hash) if hash == stored.content_hash => None,
        Ok(_) => Some(StaleReason::Changed),
        Err(e) => Some(StaleReason::ErrorReading(e.to_string())),
    }
}

/// Verify an already-resolved scope against the store
///
/// Fails with [`QuarryError::NotIndexed`] before any scan has completed.
pub fn verify_scope(
    workspace: &Workspace,
    store: &ContentStore,
    scope: &Scope,
    guardrails: &Guardrails,
    mode: VerifyMode,
) -> Result<VerifyReport> {
    if store.latest_scan()?.is_none() {
        return Err(QuarryError::NotIndexed {
            root: workspace.root.clone(),
        });
    }

    let stored = store.file_metadata()?;
    let stale = detect(
        &workspace.root,
        &scope.candidates,
        &stored,
        mode,
        scope.is_full(),
        guardrails,
    );

    info!(
        "🔎 Verified {} candidates ({:?} scope, {:?} mode): {} stale",
        scope.candidates.len(),
        scope.kind,
        mode,
        stale.len()
    );

    Ok(VerifyReport {
        scope: scope.kind,
        diff_range: scope.diff_range.clone(),
        mode,
        candidate_count: scope.candidates.len(),
        stale,
    })
}

/// Resolve the scope for `diff_range` and verify it
pub fn verify(
    workspace: &Workspace,
    store: &ContentStore,
    diff_range: Option<&str>,
    mode: VerifyMode,
    provider: &dyn DiffProvider,
) -> Result<VerifyReport> {
    let guardrails = Guardrails::from_config(&workspace.config.guardrails)?;
    let scope = resolve_scope(workspace, &guardrails, diff_range, provider)?;
    verify_scope(workspace, store, &scope, &guardrails, mode)
}
