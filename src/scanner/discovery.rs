//! File discovery under guardrails
//!
//! Both guardrail tiers (do-not-touch and read-only) exclude a path from
//! indexing. Patterns are compiled once into two glob sets: one matched
//! against file paths, one against directory paths so whole excluded trees
//! are pruned during the walk instead of being enumerated and filtered.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs::{self, Metadata};
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{QuarryError, Result};
use crate::utils::language::is_binary_extension;
use crate::utils::paths::{parent_dir, to_relative_unix_style};
use crate::workspace::GuardrailConfig;

/// Compiled exclusion rules
#[derive(Debug, Clone)]
pub struct Guardrails {
    files: GlobSet,
    dirs: GlobSet,
}

impl Guardrails {
    /// Built-in defaults merged with the user's globs
    pub fn from_config(config: &GuardrailConfig) -> Result<Self> {
        Self::new(config.merged_do_not_touch(), config.merged_read_only())
    }

    pub fn new(do_not_touch: Vec<String>, read_only: Vec<String>) -> Result<Self> {
        let mut files = GlobSetBuilder::new();
        let mut dirs = GlobSetBuilder::new();

        for pattern in do_not_touch.iter().chain(read_only.iter()) {
            files.add(compile(pattern)?);
            dirs.add(compile(pattern)?);
            // `vendor/**` also names the `vendor` directory itself
            if let Some(dir_pattern) = pattern.strip_suffix("/**") {
                if !dir_pattern.is_empty() {
                    dirs.add(compile(dir_pattern)?);
                }
            }
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| QuarryError::Pattern {
                pattern: "<guardrail set>".to_string(),
                source,
            })
        };

        Ok(Self {
            files: build(files)?,
            dirs: build(dirs)?,
        })
    }

    /// True when a relative directory (and everything below it) is excluded
    pub fn is_excluded_dir(&self, relative_dir: &str) -> bool {
        !relative_dir.is_empty() && self.dirs.is_match(relative_dir)
    }

    /// True when a relative file path is excluded, directly or through an excluded ancestor
    pub fn is_excluded(&self, relative: &str) -> bool {
        if self.files.is_match(relative) {
            return true;
        }

        let mut directory = parent_dir(relative);
        while !directory.is_empty() {
            if self.dirs.is_match(directory) {
                return true;
            }
            directory = parent_dir(directory);
        }
        false
    }

    /// Neither guardrail-excluded nor a binary format
    pub fn is_indexable(&self, relative: &str) -> bool {
        !self.is_excluded(relative) && !is_binary_extension(Path::new(relative))
    }
}

fn compile(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| QuarryError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Every indexable file under `root`, as sorted workspace-relative paths
///
/// Symlinks are not followed. A walk or path error aborts discovery.
pub fn discover_files(root: &Path, guardrails: &Guardrails) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pruned = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match to_relative_unix_style(entry.path(), root) {
                Ok(relative) => !guardrails.is_excluded_dir(&relative),
                Err(_) => true,
            }
        });

    for entry in walker {
        let entry = entry.map_err(|source| QuarryError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = to_relative_unix_style(entry.path(), root)?;
        if guardrails.is_indexable(&relative) {
            files.push(relative);
        } else {
            pruned += 1;
        }
    }

    files.sort();
    debug!(
        "Discovered {} files under {} ({} excluded)",
        files.len(),
        root.display(),
        pruned
    );
    Ok(files)
}

/// Metadata for `relative` if the walk would yield it as a file
///
/// `None` when the path is absent, is not a regular file, or is reached
/// through a symlink anywhere along the way. Other I/O errors are returned.
pub fn walkable_file(root: &Path, relative: &str) -> io::Result<Option<Metadata>> {
    let mut path = root.to_path_buf();
    let mut metadata = None;

    for component in relative.split('/').filter(|c| !c.is_empty() && *c != ".") {
        path.push(component);
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(None),
            Ok(meta) => metadata = Some(meta),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(metadata.filter(Metadata::is_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::GuardrailConfig;

    fn defaults() -> Guardrails {
        Guardrails::from_config(&GuardrailConfig::default()).unwrap()
    }

    #[test]
    fn test_default_guardrails() {
        let g = defaults();
        assert!(g.is_excluded(".git/HEAD"));
        assert!(g.is_excluded(".quarry/index.db"));
        assert!(g.is_excluded(".env"));
        assert!(g.is_excluded("config/.env"));
        assert!(g.is_excluded("web/node_modules/react/index.js"));
        assert!(g.is_excluded("certs/server.pem"));
        assert!(!g.is_excluded("src/main.rs"));
        assert!(!g.is_excluded("docs/environment.md"));
    }

    #[test]
    fn test_directory_pruning() {
        let g = defaults();
        assert!(g.is_excluded_dir(".git"));
        assert!(g.is_excluded_dir("web/node_modules"));
        assert!(!g.is_excluded_dir("src"));
        assert!(!g.is_excluded_dir(""));
    }

    #[test]
    fn test_user_patterns_extend_defaults() {
        let config = GuardrailConfig {
            do_not_touch: vec!["secrets/**".to_string()],
            read_only: vec!["**/*.generated.go".to_string()],
        };
        let g = Guardrails::from_config(&config).unwrap();
        assert!(g.is_excluded("secrets/prod.txt"));
        assert!(g.is_excluded_dir("secrets"));
        assert!(g.is_excluded("api/types.generated.go"));
        assert!(g.is_excluded(".git/config"));
        assert!(!g.is_excluded("api/types.go"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let result = Guardrails::new(vec!["src/[".to_string()], vec![]);
        assert!(matches!(result, Err(QuarryError::Pattern { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_walkable_file_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real/a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(root.join("real/a.txt"), root.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("linked")).unwrap();

        assert!(walkable_file(root, "real/a.txt").unwrap().is_some());
        assert!(walkable_file(root, "link.txt").unwrap().is_none());
        assert!(walkable_file(root, "linked/a.txt").unwrap().is_none());
        assert!(walkable_file(root, "real").unwrap().is_none(), "directories are not files");
        assert!(walkable_file(root, "real/a.txt/inner").unwrap().is_none());
        assert!(walkable_file(root, "absent.txt").unwrap().is_none());

        let discovered = discover_files(root, &defaults()).unwrap();
        assert_eq!(discovered, vec!["real/a.txt"], "the walk agrees");
    }
}
