//! Change-signal artifact: a persisted diff result handed between processes.
//!
//! Written by [`produce_signal`] (typically from a hook that already knows the
//! range) and consumed by the scope resolver in place of running git again.
//! The recorded hashes pin the signal to the working tree it was produced
//! from: once a surviving path's content moves on, the resolver ignores the
//! signal and asks the diff provider instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{Change, ChangeStatus, DiffProvider, filter_changes};
use crate::error::{IoResultExt, QuarryError, Result};
use crate::scanner::{Guardrails, calculate_file_hash, walkable_file};
use crate::utils::paths::resolve;
use crate::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSignal {
    pub diff_range: String,
    pub changes: Vec<Change>,
}

/// Read the artifact at `path`; `None` when absent, an error when unreadable
pub fn read_signal(path: &Path) -> Result<Option<ChangeSignal>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).at(path)?;
    let signal = serde_json::from_str(&raw).map_err(|source| QuarryError::Artifact {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(signal))
}

pub fn write_signal(path: &Path, signal: &ChangeSignal) -> Result<()> {
    let json = serde_json::to_string_pretty(signal).map_err(|source| QuarryError::Artifact {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).at(&tmp)?;
    fs::rename(&tmp, path).at(path)?;
    Ok(())
}

/// Whether every added or modified path still looks the way the signal recorded it
///
/// A recorded hash must match the file's current content; a path recorded
/// without one must still be absent.
pub(crate) fn matches_working_tree(root: &Path, changes: &[Change]) -> bool {
    changes
        .iter()
        .filter(|change| change.status.is_reindex_worthy())
        .all(|change| match &change.hash {
            Some(recorded) => match calculate_file_hash(&resolve(root, &change.path)) {
                Ok(hash) => &hash == recorded,
                Err(_) => false,
            },
            None => matches!(walkable_file(root, &change.path), Ok(None)),
        })
}

/// Resolve `range` through `provider`, hash surviving paths, and persist the artifact
///
/// Deleted paths carry no hash; added or modified paths that no longer exist
/// in the working tree are recorded without one.
pub fn produce_signal(
    workspace: &Workspace,
    range: &str,
    provider: &dyn DiffProvider,
    guardrails: &Guardrails,
) -> Result<ChangeSignal> {
    let range = range.trim();
    if range.is_empty() {
        return Err(QuarryError::ScopeUnresolved {
            range: range.to_string(),
            reason: "a change signal needs a diff range".to_string(),
        });
    }

    let changes = provider.changed_paths(&workspace.root, range)?;
    let mut changes = filter_changes(&workspace.root, changes, guardrails, range)?;

    for change in &mut changes {
        if change.status == ChangeStatus::Deleted {
            continue;
        }
        let full_path = resolve(&workspace.root, &change.path);
        change.hash = if walkable_file(&workspace.root, &change.path)
            .at(&full_path)?
            .is_some()
        {
            Some(calculate_file_hash(&full_path)?)
        } else {
            debug!("{} not in working tree, no hash recorded", change.path);
            None
        };
    }

    let signal = ChangeSignal {
        diff_range: range.to_string(),
        changes,
    };

    workspace.ensure_dir()?;
    let path = workspace.change_signal_path();
    write_signal(&path, &signal)?;
    info!(
        "📨 Wrote change signal for {} ({} changes) to {}",
        range,
        signal.changes.len(),
        path.display()
    );
    Ok(signal)
}
