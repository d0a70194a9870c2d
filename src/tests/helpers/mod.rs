pub mod tempdir;

// Re-export the unique_temp_dir function for easy access
pub use tempdir::unique_temp_dir;

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::analysis::{Analyzer, AnalyzerRegistry, CallRef, FileAnalysis, SymbolDef, SymbolKind};
use crate::database::{ContentStore, ScanSummary};
use crate::error::{QuarryError, Result};
use crate::scanner::Scanner;
use crate::scope::{Change, ChangeStatus, DiffProvider};
use crate::workspace::{CONFIG_FILE, Workspace};

/// A throwaway project root with a `.quarry` directory
pub struct TestWorkspace {
    pub dir: TempDir,
    pub workspace: Workspace,
}

impl TestWorkspace {
    pub fn new(test_name: &str) -> Self {
        let dir = unique_temp_dir(test_name);
        let workspace = Workspace::open(dir.path()).unwrap();
        workspace.ensure_dir().unwrap();
        Self { dir, workspace }
    }

    /// Write `.quarry/config.toml` and reload the workspace from disk
    pub fn with_config_toml(test_name: &str, toml: &str) -> Self {
        let mut test = Self::new(test_name);
        fs::write(test.workspace.quarry_dir.join(CONFIG_FILE), toml).unwrap();
        test.workspace = Workspace::open(test.dir.path()).unwrap();
        test
    }

    pub fn root(&self) -> &Path {
        &self.workspace.root
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).unwrap();
    }

    pub fn open_store(&self) -> ContentStore {
        ContentStore::open(self.workspace.database_path()).unwrap()
    }

    /// Scanner with the Go-like test analyzer registered
    pub fn scanner(&self) -> Scanner {
        Scanner::new(&self.workspace, test_registry()).unwrap()
    }

    pub fn scan(&self) -> (ContentStore, ScanSummary) {
        let mut store = self.open_store();
        let summary = self.scanner().scan(&mut store).unwrap();
        (store, summary)
    }
}

pub fn test_registry() -> AnalyzerRegistry {
    AnalyzerRegistry::new()
        .with(Arc::new(GoLikeAnalyzer::new()))
        .with(Arc::new(FailingAnalyzer))
}

/// Line-pattern analyzer for Go-style sources
///
/// `func Name(` / `func (r *T) Name(` open a symbol that ends at the next line
/// consisting of a lone `}`. Every `ident(` or `pkg.ident(` outside a
/// definition line is a call.
pub struct GoLikeAnalyzer {
    definition: Regex,
    call: Regex,
}

impl GoLikeAnalyzer {
    pub fn new() -> Self {
        Self {
            definition: Regex::new(r"^\s*func\s+(\([^)]*\)\s*)?([A-Za-z_]\w*)\s*\(").unwrap(),
            call: Regex::new(r"([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)\s*\(").unwrap(),
        }
    }
}

impl Analyzer for GoLikeAnalyzer {
    fn language(&self) -> &str {
        "go"
    }

    fn analyze(&self, _path: &str, content: &str) -> anyhow::Result<FileAnalysis> {
        let lines: Vec<&str> = content.lines().collect();
        let mut analysis = FileAnalysis::default();

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;

            if let Some(caps) = self.definition.captures(line) {
                let end = lines[idx + 1..]
                    .iter()
                    .position(|l| l.trim() == "}")
                    .map(|offset| line_no + offset + 1)
                    .unwrap_or(line_no);
                analysis.symbols.push(SymbolDef {
                    name: caps[2].to_string(),
                    kind: if caps.get(1).is_some() {
                        SymbolKind::Method
                    } else {
                        SymbolKind::Function
                    },
                    line_start: line_no,
                    line_end: end,
                });
                continue;
            }

            for caps in self.call.captures_iter(line) {
                let target = &caps[1];
                if matches!(target, "if" | "for" | "switch" | "return" | "func") {
                    continue;
                }
                analysis.calls.push(CallRef {
                    target: target.to_string(),
                    line: line_no,
                });
            }
        }

        Ok(analysis)
    }
}

/// Always fails; registered for Python so scans exercise analyzer errors
pub struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn language(&self) -> &str {
        "python"
    }

    fn analyze(&self, path: &str, _content: &str) -> anyhow::Result<FileAnalysis> {
        anyhow::bail!("cannot parse {}", path)
    }
}

/// Diff provider returning a canned change list for any range
#[derive(Default)]
pub struct FakeDiff {
    pub changes: Vec<Change>,
}

impl FakeDiff {
    pub fn with(changes: &[(&str, ChangeStatus)]) -> Self {
        Self {
            changes: changes
                .iter()
                .map(|(path, status)| Change {
                    path: path.to_string(),
                    status: *status,
                    hash: None,
                })
                .collect(),
        }
    }
}

impl DiffProvider for FakeDiff {
    fn changed_paths(&self, _root: &Path, _range: &str) -> Result<Vec<Change>> {
        Ok(self.changes.clone())
    }
}

/// Diff provider that can never resolve a range
pub struct UnresolvableDiff;

impl DiffProvider for UnresolvableDiff {
    fn changed_paths(&self, _root: &Path, range: &str) -> Result<Vec<Change>> {
        Err(QuarryError::ScopeUnresolved {
            range: range.to_string(),
            reason: "unknown revision".to_string(),
        })
    }
}
