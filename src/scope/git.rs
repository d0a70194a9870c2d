//! Version-control collaborator for diff-scoped verification.

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use super::{Change, ChangeStatus};
use crate::error::{QuarryError, Result};

/// Lists the paths changed by a diff range
///
/// Implementations must fail with [`QuarryError::ScopeUnresolved`] rather
/// than guess when the range cannot be resolved.
pub trait DiffProvider: Send + Sync {
    fn changed_paths(&self, root: &Path, range: &str) -> Result<Vec<Change>>;
}

/// `git diff --name-status` against the workspace root
#[derive(Debug, Clone)]
pub struct GitDiff {
    program: String,
}

impl Default for GitDiff {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DiffProvider for GitDiff {
    fn changed_paths(&self, root: &Path, range: &str) -> Result<Vec<Change>> {
        let unresolved = |reason: String| QuarryError::ScopeUnresolved {
            range: range.to_string(),
            reason,
        };

        if range.starts_with('-') {
            return Err(unresolved("range must be a revision, not an option".to_string()));
        }

        debug!("Running git diff {} in {}", range, root.display());
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(root)
            .args(["diff", "--name-status", "-z", "--no-renames", "--relative"])
            .arg(range)
            .arg("--")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| unresolved(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unresolved(format!(
                "git diff exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_name_status(&output.stdout).map_err(unresolved)
    }
}

/// Map a `--name-status` letter to a change status
pub fn status_from_code(code: &str) -> Option<ChangeStatus> {
    match code {
        "A" => Some(ChangeStatus::Added),
        "M" | "T" | "U" => Some(ChangeStatus::Modified),
        "D" => Some(ChangeStatus::Deleted),
        _ => None,
    }
}

/// Parse NUL-separated `status\0path\0` pairs
pub fn parse_name_status(raw: &[u8]) -> std::result::Result<Vec<Change>, String> {
    let mut fields = raw
        .split(|b| *b == 0)
        .map(|field| String::from_utf8_lossy(field).into_owned());
    let mut changes = Vec::new();

    while let Some(code) = fields.next() {
        if code.is_empty() {
            continue;
        }
        let status = status_from_code(&code)
            .ok_or_else(|| format!("unsupported diff status '{}'", code))?;
        let path = fields
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("diff status '{}' without a path", code))?;

        changes.push(Change {
            path,
            status,
            hash: None,
        });
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_status() {
        let raw = b"M\0src/lib.rs\0A\0docs/new.md\0D\0old.txt\0T\0link\0";
        let changes = parse_name_status(raw).unwrap();
        let summary: Vec<(&str, ChangeStatus)> = changes
            .iter()
            .map(|c| (c.path.as_str(), c.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("src/lib.rs", ChangeStatus::Modified),
                ("docs/new.md", ChangeStatus::Added),
                ("old.txt", ChangeStatus::Deleted),
                ("link", ChangeStatus::Modified),
            ]
        );
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(parse_name_status(b"X\0weird\0").is_err());
        assert!(parse_name_status(b"M\0").is_err());
        assert!(parse_name_status(b"").unwrap().is_empty());
    }

    #[test]
    fn test_option_like_range_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GitDiff::new().changed_paths(dir.path(), "--output=/tmp/x");
        assert!(matches!(result, Err(QuarryError::ScopeUnresolved { .. })));
    }
}
