//! Context collection: gather indexed chunks for a scope, but only from a
//! fresh index.

use serde::Serialize;
use tracing::{info, warn};

use crate::database::{ContentStore, StoredChunk};
use crate::error::{QuarryError, Result};
use crate::scanner::Guardrails;
use crate::scope::{DiffProvider, ScopeKind, resolve_scope};
use crate::staleness::{VerifyMode, verify_scope};
use crate::workspace::Workspace;

/// One file's indexed chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedFile {
    pub path: String,
    pub chunks: Vec<StoredChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextPack {
    pub scope: ScopeKind,
    pub diff_range: Option<String>,
    pub files: Vec<CollectedFile>,
    /// Paths deleted by the diff range
    pub removed: Vec<String>,
    /// More files qualified than `collect.max_files` allows
    pub truncated: bool,
}

/// Collect chunks for `diff_range` (or every indexed file)
///
/// Verifies the same scope first and fails with [`QuarryError::StaleIndex`]
/// if anything drifted, so consumers never see outdated text.
pub fn collect(
    workspace: &Workspace,
    store: &ContentStore,
    diff_range: Option<&str>,
    mode: VerifyMode,
    provider: &dyn DiffProvider,
) -> Result<ContextPack> {
    let guardrails = Guardrails::from_config(&workspace.config.guardrails)?;
    let scope = resolve_scope(workspace, &guardrails, diff_range, provider)?;
    let report = verify_scope(workspace, store, &scope, &guardrails, mode)?;
    if !report.is_fresh() {
        warn!(
            "Refusing to collect: {} stale path(s) in scope",
            report.stale.len()
        );
        return Err(QuarryError::StaleIndex(report.stale));
    }

    let (mut paths, removed): (Vec<String>, Vec<String>) = match scope.kind {
        ScopeKind::Full => (store.indexed_paths()?, Vec::new()),
        ScopeKind::Diff => (
            scope.reindex_paths().into_iter().map(str::to_string).collect(),
            scope.removed_paths().into_iter().map(str::to_string).collect(),
        ),
    };
    paths.sort();

    let max_files = workspace.config.collect.max_files;
    let truncated = paths.len() > max_files;
    paths.truncate(max_files);

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let chunks = store.chunks_for_path(&path)?;
        files.push(CollectedFile { path, chunks });
    }

    info!(
        "📦 Collected {} files ({} removed{})",
        files.len(),
        removed.len(),
        if truncated { ", truncated" } else { "" }
    );

    Ok(ContextPack {
        scope: scope.kind,
        diff_range: scope.diff_range,
        files,
        removed,
        truncated,
    })
}
