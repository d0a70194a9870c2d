//! Change-scope resolution
//!
//! Decides which paths a verify or collect run considers. With no diff range
//! the scope is the full guardrail-filtered tree. With a range, the changed
//! paths come from a matching change-signal artifact or, failing that, from
//! the [`DiffProvider`]. A signal is only trusted while the working tree still
//! holds the content it recorded. A range that cannot be resolved is an
//! error; the resolver never substitutes the full tree.
//!
//! Changed paths follow the scan walk's rule: a path that exists but is a
//! symlink (or sits under one, or is not a regular file) is treated as
//! deleted, since the scan would never index it.

pub mod git;
pub mod signal;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{QuarryError, Result};
use crate::scanner::{Guardrails, discover_files, walkable_file};
use crate::utils::paths::{escapes_root, normalize_relative, resolve};
use crate::workspace::Workspace;

pub use git::{DiffProvider, GitDiff};
pub use signal::{ChangeSignal, produce_signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
}

impl ChangeStatus {
    /// Added and modified paths need (re)indexing; deleted ones need removal
    pub fn is_reindex_worthy(&self) -> bool {
        matches!(self, ChangeStatus::Added | ChangeStatus::Modified)
    }
}

/// One path touched by a diff range; `hash` is never set for deletions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub status: ChangeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Full,
    Diff,
}

/// The paths a verification or collection run considers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub kind: ScopeKind,
    pub diff_range: Option<String>,
    /// Sorted, slash-normalized, guardrail-filtered
    pub candidates: Vec<String>,
    /// Changes behind a diff scope, in diff order (empty for full scope)
    pub changes: Vec<Change>,
}

impl Scope {
    pub fn is_full(&self) -> bool {
        self.kind == ScopeKind::Full
    }

    /// Added or modified paths
    pub fn reindex_paths(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| c.status.is_reindex_worthy())
            .map(|c| c.path.as_str())
            .collect()
    }

    pub fn removed_paths(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| c.status == ChangeStatus::Deleted)
            .map(|c| c.path.as_str())
            .collect()
    }
}

/// Resolve the scope for `diff_range` (`None` or blank means the full tree)
pub fn resolve_scope(
    workspace: &Workspace,
    guardrails: &Guardrails,
    diff_range: Option<&str>,
    provider: &dyn DiffProvider,
) -> Result<Scope> {
    let range = diff_range.map(str::trim).filter(|r| !r.is_empty());

    let Some(range) = range else {
        let candidates = discover_files(&workspace.root, guardrails)?;
        debug!("Full scope: {} candidates", candidates.len());
        return Ok(Scope {
            kind: ScopeKind::Full,
            diff_range: None,
            candidates,
            changes: Vec::new(),
        });
    };

    let root = &workspace.root;
    let from_provider = || -> Result<Vec<Change>> {
        let changes = provider.changed_paths(root, range)?;
        filter_changes(root, changes, guardrails, range)
    };

    let changes = match signal::read_signal(&workspace.change_signal_path())? {
        Some(signal) if signal.diff_range == range => {
            let changes = filter_changes(root, signal.changes, guardrails, range)?;
            if signal::matches_working_tree(root, &changes) {
                info!("📨 Using change signal for {}", range);
                changes
            } else {
                debug!(
                    "Change signal for '{}' no longer matches the working tree; asking the diff provider",
                    range
                );
                from_provider()?
            }
        }
        Some(signal) => {
            debug!(
                "Change signal is for '{}', not '{}'; asking the diff provider",
                signal.diff_range, range
            );
            from_provider()?
        }
        None => from_provider()?,
    };

    let mut candidates: Vec<String> = changes.iter().map(|c| c.path.clone()).collect();
    candidates.sort();

    debug!("Diff scope {}: {} candidates", range, candidates.len());
    Ok(Scope {
        kind: ScopeKind::Diff,
        diff_range: Some(range.to_string()),
        candidates,
        changes,
    })
}

/// Normalize paths, drop guardrail-excluded ones and duplicates (first occurrence wins)
///
/// An added or modified path that exists under `root` but is not a walkable
/// file is downgraded to a deletion.
pub(crate) fn filter_changes(
    root: &Path,
    changes: Vec<Change>,
    guardrails: &Guardrails,
    range: &str,
) -> Result<Vec<Change>> {
    let mut seen = HashSet::new();
    let mut filtered = Vec::with_capacity(changes.len());

    for mut change in changes {
        let path = normalize_relative(&change.path);
        if path.is_empty() || escapes_root(&path) {
            return Err(QuarryError::ScopeUnresolved {
                range: range.to_string(),
                reason: format!("changed path '{}' is outside the workspace", change.path),
            });
        }
        if !guardrails.is_indexable(&path) {
            debug!("Scope drops excluded path {}", path);
            continue;
        }
        if !seen.insert(path.clone()) {
            continue;
        }
        if change.status.is_reindex_worthy() && is_unwalkable(root, &path) {
            debug!("Scope treats {} as deleted: not a regular file", path);
            change.status = ChangeStatus::Deleted;
        }
        change.path = path;
        if change.status == ChangeStatus::Deleted {
            change.hash = None;
        }
        filtered.push(change);
    }

    Ok(filtered)
}

/// Present on disk in some form the scan walk skips
fn is_unwalkable(root: &Path, relative: &str) -> bool {
    matches!(walkable_file(root, relative), Ok(None))
        && fs::symlink_metadata(resolve(root, relative)).is_ok()
}
