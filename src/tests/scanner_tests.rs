// Scanner tests: determinism, guardrails, artifacts and analyzer failures

use std::fs;

use crate::error::QuarryError;
use crate::scanner::{compute_scan_hash, read_summary_artifact};
use crate::scope::GitDiff;
use crate::staleness::{VerifyMode, verify};
use crate::tests::helpers::TestWorkspace;

fn populate(test: &TestWorkspace) {
    test.write(
        "auth/login.go",
        "package auth\n\nfunc ValidatePassword(user string, pw string) bool {\n\treturn hashPassword(pw) == lookup(user)\n}\n",
    );
    test.write("README.md", "# Demo\n\nA small demo project.\n");
    test.write("cmd/main.go", "package main\n\nfunc main() {\n\tauth.ValidatePassword(\"a\", \"b\")\n}\n");
}

#[test]
fn test_rescan_is_deterministic() {
    let test = TestWorkspace::new("scan_determinism");
    populate(&test);

    let (store, first) = test.scan();
    let first_chunks = store.chunks_for_path("auth/login.go").unwrap();
    drop(store);

    let (store, second) = test.scan();
    assert_eq!(first.scan_hash, second.scan_hash);
    assert_eq!(first.file_count, second.file_count);
    assert_eq!(first.chunk_count, second.chunk_count);
    assert!(second.id > first.id);
    assert_eq!(store.chunks_for_path("auth/login.go").unwrap(), first_chunks);

    let report = verify(&test.workspace, &store, None, VerifyMode::Strict, &GitDiff::new()).unwrap();
    assert!(report.is_fresh(), "unexpected stale entries: {:?}", report.stale);
}

#[test]
fn test_scan_hash_ignores_enumeration_order() {
    let test_a = TestWorkspace::new("scan_order_a");
    test_a.write("b.txt", "bee\n");
    test_a.write("a.txt", "ay\n");
    let test_b = TestWorkspace::new("scan_order_b");
    test_b.write("a.txt", "ay\n");
    test_b.write("b.txt", "bee\n");

    let (_, summary_a) = test_a.scan();
    let (_, summary_b) = test_b.scan();
    assert_eq!(summary_a.scan_hash, summary_b.scan_hash);

    let expected = compute_scan_hash([
        ("a.txt", blake3::hash(b"ay\n").to_hex().as_str()),
        ("b.txt", blake3::hash(b"bee\n").to_hex().as_str()),
    ]);
    assert_eq!(summary_a.scan_hash, expected);
}

#[test]
fn test_scan_hash_changes_with_content() {
    let test = TestWorkspace::new("scan_hash_changes");
    test.write("a.txt", "one\n");
    let (_, before) = test.scan();

    test.write("a.txt", "two\n");
    let (_, after) = test.scan();
    assert_ne!(before.scan_hash, after.scan_hash);
}

#[test]
fn test_guardrails_and_binaries_are_not_indexed() {
    let test = TestWorkspace::with_config_toml(
        "scan_guardrails",
        "[guardrails]\ndo_not_touch = [\"secrets/**\"]\nread_only = [\"**/*.gen.go\"]\n",
    );
    test.write("src/app.go", "package app\n");
    test.write("src/types.gen.go", "package app\n");
    test.write("secrets/token.txt", "hunter2\n");
    test.write("web/node_modules/lib/index.js", "module.exports = 1\n");
    test.write(".env", "KEY=value\n");
    test.write("assets/logo.png", "not really a png\n");
    test.write(".git/HEAD", "ref: refs/heads/main\n");

    let (store, summary) = test.scan();
    assert_eq!(store.indexed_paths().unwrap(), vec!["src/app.go"]);
    assert_eq!(summary.file_count, 1);
}

#[test]
fn test_scan_records_symbols_and_calls() {
    let test = TestWorkspace::new("scan_symbols");
    populate(&test);

    let (store, _) = test.scan();
    let stats = store.stats().unwrap();
    assert_eq!(stats.total_symbols, 2, "ValidatePassword and main");
    assert!(stats.total_calls >= 3);

    let definitions = store
        .find_symbol_definitions("ValidatePassword", None)
        .unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].path, "auth/login.go");
    assert_eq!((definitions[0].line_start, definitions[0].line_end), (3, 5));
}

#[test]
fn test_analyzer_failure_does_not_abort_scan() {
    let test = TestWorkspace::new("scan_analyzer_failure");
    test.write("tool.py", "def run():\n    pass\n");
    test.write("lib.go", "package lib\n\nfunc Run() {\n}\n");

    let (store, summary) = test.scan();
    assert_eq!(summary.file_count, 2);
    assert_eq!(store.chunks_for_path("tool.py").unwrap().len(), 1);
    assert_eq!(store.stats().unwrap().total_symbols, 1);
}

#[test]
fn test_scan_writes_summary_artifact() {
    let test = TestWorkspace::new("scan_artifact");
    populate(&test);

    assert!(read_summary_artifact(&test.workspace).unwrap().is_none());
    let (_, summary) = test.scan();

    let artifact = read_summary_artifact(&test.workspace).unwrap().unwrap();
    assert_eq!(artifact, summary);
    assert!(
        !test.workspace.quarry_dir.join("scan_summary.json.tmp").exists(),
        "temporary artifact must be renamed into place"
    );
}

#[test]
fn test_scan_summary_matches_store() {
    let test = TestWorkspace::new("scan_summary_store");
    populate(&test);

    let (store, summary) = test.scan();
    let stats = store.stats().unwrap();
    assert_eq!(summary.file_count as i64, stats.total_files);
    assert_eq!(summary.chunk_count as i64, stats.total_chunks);
    assert_eq!(store.latest_scan().unwrap(), Some(summary.clone()));
    assert!(summary.completed_at >= summary.started_at);
    assert_eq!(summary.root, test.root().to_string_lossy().replace('\\', "/"));
}

#[test]
fn test_invalid_guardrail_pattern_fails_before_scanning() {
    let test = TestWorkspace::with_config_toml(
        "scan_bad_pattern",
        "[guardrails]\nread_only = [\"src/[\"]\n",
    );
    test.write("a.txt", "a\n");

    let result = crate::scanner::Scanner::new(&test.workspace, Default::default());
    assert!(matches!(result, Err(QuarryError::Pattern { .. })));
    assert!(
        !test.workspace.database_path().exists(),
        "no store should have been created"
    );
}

#[test]
fn test_empty_workspace_scans_to_empty_index() {
    let test = TestWorkspace::new("scan_empty");
    let (store, summary) = test.scan();

    assert_eq!(summary.file_count, 0);
    assert_eq!(summary.chunk_count, 0);
    assert!(store.indexed_paths().unwrap().is_empty());
    assert!(
        fs::metadata(test.workspace.scan_summary_path()).is_ok(),
        "artifact is written even for an empty tree"
    );
}
