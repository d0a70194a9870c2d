// src/workspace/mod.rs
//! Quarry Workspace Management
//!
//! A workspace is a project root plus its `.quarry` directory, which holds:
//! - `index.db` - the SQLite content store (files, chunks, full-text index)
//! - `config.toml` - chunking, guardrail, search and collect settings
//! - `rooms.toml` - curated room manifest used to group search results
//! - `scan_summary.json` / `change_signal.json` - file-based handoff artifacts

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{IoResultExt, QuarryError, Result};

pub const QUARRY_DIR: &str = ".quarry";
pub const DATABASE_FILE: &str = "index.db";
pub const CONFIG_FILE: &str = "config.toml";
pub const ROOMS_FILE: &str = "rooms.toml";
pub const SCAN_SUMMARY_FILE: &str = "scan_summary.json";
pub const CHANGE_SIGNAL_FILE: &str = "change_signal.json";

/// Built-in "do-not-touch" guardrails. User globs are appended, never substituted.
pub const DEFAULT_DO_NOT_TOUCH: &[&str] = &[
    ".git/**",
    ".quarry/**",
    "**/.env",
    "**/*.pem",
    "**/*.key",
];

/// Built-in "read-only" guardrails (generated or vendored trees)
pub const DEFAULT_READ_ONLY: &[&str] = &[
    "**/node_modules/**",
    "**/target/**",
    "**/dist/**",
    "**/build/**",
    "**/__pycache__/**",
    "**/.venv/**",
];

/// Configuration for a Quarry workspace, read from `.quarry/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub chunking: ChunkingConfig,
    pub guardrails: GuardrailConfig,
    pub search: SearchConfig,
    pub collect: CollectConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum lines per chunk
    pub max_lines: usize,
    /// Maximum bytes per chunk (a single longer line still gets its own chunk)
    pub max_bytes: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_lines: 60,
            max_bytes: 4096,
        }
    }
}

/// User-declared exclusion globs, merged with the built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    pub do_not_touch: Vec<String>,
    pub read_only: Vec<String>,
}

impl GuardrailConfig {
    /// Defaults first, then user patterns, duplicates dropped
    pub fn merged_do_not_touch(&self) -> Vec<String> {
        merge_patterns(DEFAULT_DO_NOT_TOUCH, &self.do_not_touch)
    }

    pub fn merged_read_only(&self) -> Vec<String> {
        merge_patterns(DEFAULT_READ_ONLY, &self.read_only)
    }
}

fn merge_patterns(defaults: &[&str], user: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = defaults.iter().map(|p| p.to_string()).collect();
    for pattern in user {
        if !merged.contains(pattern) {
            merged.push(pattern.clone());
        }
    }
    merged
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub max_files: usize,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self { max_files: 200 }
    }
}

impl WorkspaceConfig {
    /// Parse and validate a TOML config document
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        let config: WorkspaceConfig = toml::from_str(content).map_err(|e| QuarryError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let invalid = |message: &str| QuarryError::Config {
            path: origin.to_path_buf(),
            message: message.to_string(),
        };

        if self.chunking.max_lines == 0 {
            return Err(invalid("chunking.max_lines must be at least 1"));
        }
        if self.chunking.max_bytes == 0 {
            return Err(invalid("chunking.max_bytes must be at least 1"));
        }
        if self.search.default_limit == 0 {
            return Err(invalid("search.default_limit must be at least 1"));
        }
        Ok(())
    }
}

/// A project root and its `.quarry` data directory
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Project root directory being indexed
    pub root: PathBuf,

    /// The .quarry directory for all workspace data
    pub quarry_dir: PathBuf,

    /// Workspace configuration
    pub config: WorkspaceConfig,
}

impl Workspace {
    /// Open the workspace rooted at `root`, loading `.quarry/config.toml` when present
    ///
    /// Nothing is created on disk; use [`Workspace::ensure_dir`] before writing.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().at(root)?;
        let quarry_dir = root.join(QUARRY_DIR);
        let config = Self::load_config(&quarry_dir)?;

        debug!("Opened workspace at {}", root.display());
        Ok(Self {
            root,
            quarry_dir,
            config,
        })
    }

    /// Build a workspace with an explicit configuration (no config file read)
    pub fn with_config(root: impl AsRef<Path>, config: WorkspaceConfig) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().at(root)?;
        let quarry_dir = root.join(QUARRY_DIR);
        Ok(Self {
            root,
            quarry_dir,
            config,
        })
    }

    /// Create `.quarry/` (and its .gitignore) if missing
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.quarry_dir.exists() {
            fs::create_dir_all(&self.quarry_dir).at(&self.quarry_dir)?;
            info!("Created {}", self.quarry_dir.display());
        }

        let gitignore_path = self.quarry_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(
                &gitignore_path,
                "# Quarry index data - do not commit to version control\n\
                *\n\
                !.gitignore\n",
            )
            .at(&gitignore_path)?;
            debug!("Created .gitignore in .quarry directory");
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.quarry_dir.join(DATABASE_FILE)
    }

    pub fn rooms_path(&self) -> PathBuf {
        self.quarry_dir.join(ROOMS_FILE)
    }

    pub fn scan_summary_path(&self) -> PathBuf {
        self.quarry_dir.join(SCAN_SUMMARY_FILE)
    }

    pub fn change_signal_path(&self) -> PathBuf {
        self.quarry_dir.join(CHANGE_SIGNAL_FILE)
    }

    /// Load workspace configuration from config.toml
    fn load_config(quarry_dir: &Path) -> Result<WorkspaceConfig> {
        let config_path = quarry_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            debug!("No {} found, using defaults", config_path.display());
            return Ok(WorkspaceConfig::default());
        }

        let content = fs::read_to_string(&config_path).at(&config_path)?;
        let config = WorkspaceConfig::from_toml(&content, &config_path)?;

        debug!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }
}
