// Workspace configuration tests

use std::fs;
use std::path::Path;

use crate::error::QuarryError;
use crate::tests::helpers::{TestWorkspace, unique_temp_dir};
use crate::workspace::*;

#[test]
fn test_missing_config_uses_defaults() {
    let temp_dir = unique_temp_dir("workspace_defaults");
    let workspace = Workspace::open(temp_dir.path()).unwrap();

    assert_eq!(workspace.config, WorkspaceConfig::default());
    assert_eq!(workspace.config.chunking.max_lines, 60);
    assert_eq!(workspace.config.chunking.max_bytes, 4096);
    assert_eq!(workspace.config.search.default_limit, 10);
    assert_eq!(workspace.config.collect.max_files, 200);
    assert!(
        !workspace.quarry_dir.exists(),
        "opening a workspace must not create anything"
    );
}

#[test]
fn test_ensure_dir_creates_gitignore() {
    let temp_dir = unique_temp_dir("workspace_ensure");
    let workspace = Workspace::open(temp_dir.path()).unwrap();

    workspace.ensure_dir().unwrap();
    workspace.ensure_dir().unwrap();

    let gitignore = fs::read_to_string(workspace.quarry_dir.join(".gitignore")).unwrap();
    assert!(gitignore.contains('*'));
    assert_eq!(
        workspace.database_path(),
        workspace.quarry_dir.join(DATABASE_FILE)
    );
}

#[test]
fn test_partial_config_keeps_other_defaults() {
    let test = TestWorkspace::with_config_toml(
        "workspace_partial",
        "[chunking]\nmax_lines = 5\n\n[guardrails]\nread_only = [\"generated/**\"]\n",
    );
    let config = &test.workspace.config;

    assert_eq!(config.chunking.max_lines, 5);
    assert_eq!(config.chunking.max_bytes, 4096);
    assert_eq!(config.search.default_limit, 10);
    assert_eq!(config.guardrails.read_only, vec!["generated/**"]);
}

#[test]
fn test_user_guardrails_merge_with_defaults() {
    let config = GuardrailConfig {
        do_not_touch: vec!["secrets/**".to_string(), ".git/**".to_string()],
        read_only: vec!["vendor/**".to_string()],
    };

    let do_not_touch = config.merged_do_not_touch();
    assert_eq!(do_not_touch.len(), DEFAULT_DO_NOT_TOUCH.len() + 1);
    assert!(do_not_touch.iter().any(|p| p == ".quarry/**"));
    assert_eq!(do_not_touch.last().map(String::as_str), Some("secrets/**"));

    let read_only = config.merged_read_only();
    assert!(read_only.iter().any(|p| p == "**/node_modules/**"));
    assert!(read_only.iter().any(|p| p == "vendor/**"));
}

#[test]
fn test_zero_limits_are_rejected() {
    let origin = Path::new("config.toml");
    for bad in [
        "[chunking]\nmax_lines = 0\n",
        "[chunking]\nmax_bytes = 0\n",
        "[search]\ndefault_limit = 0\n",
    ] {
        let result = WorkspaceConfig::from_toml(bad, origin);
        assert!(
            matches!(result, Err(QuarryError::Config { .. })),
            "expected config error for {:?}",
            bad
        );
    }
}

#[test]
fn test_malformed_config_fails_open() {
    let temp_dir = unique_temp_dir("workspace_malformed");
    fs::create_dir_all(temp_dir.path().join(QUARRY_DIR)).unwrap();
    fs::write(
        temp_dir.path().join(QUARRY_DIR).join(CONFIG_FILE),
        "[chunking\nmax_lines = ",
    )
    .unwrap();

    let result = Workspace::open(temp_dir.path());
    assert!(matches!(result, Err(QuarryError::Config { .. })));
}
