//! Path utilities
//!
//! Every path stored in the index is workspace-relative and uses `/` separators,
//! regardless of platform. Keys in the files table, change sets and staleness
//! reports all go through these helpers so they compare equal.

use std::path::{Component, Path};

use crate::error::{QuarryError, Result};

/// Convert a path under `workspace_root` into a relative Unix-style path
///
/// Unlike canonicalizing both sides, this works for paths that no longer exist
/// on disk (deleted files named by a diff).
pub fn to_relative_unix_style(path: &Path, workspace_root: &Path) -> Result<String> {
    let relative = path.strip_prefix(workspace_root).map_err(|_| QuarryError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not within workspace root '{}'", workspace_root.display()),
        ),
    })?;

    Ok(normalize_relative(&relative.to_string_lossy()))
}

/// Slash-normalize a relative path string: backslashes become `/`, `.` segments
/// and duplicate separators are dropped, and a leading `./` or `/` is removed.
pub fn normalize_relative(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a stored relative path back onto the workspace root
pub fn resolve(workspace_root: &Path, relative: &str) -> std::path::PathBuf {
    let mut full = workspace_root.to_path_buf();
    for segment in relative.split('/') {
        full.push(segment);
    }
    full
}

/// Directory part of a relative Unix-style path ("" for top-level files)
pub fn parent_dir(relative: &str) -> &str {
    match relative.rfind('/') {
        Some(idx) => &relative[..idx],
        None => "",
    }
}

/// True when `relative` escapes the workspace (contains `..`)
pub fn escapes_root(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}
