// Content store tests: schema, transactional replace, cascades and queries

use chrono::Utc;

use crate::analysis::{CallRef, FileAnalysis, SymbolDef, SymbolKind};
use crate::chunker::chunk;
use crate::database::*;
use crate::error::QuarryError;
use crate::scanner::{compute_scan_hash, hash_bytes};
use crate::tests::helpers::unique_temp_dir;

fn indexed(path: &str, content: &str) -> IndexedFile {
    IndexedFile {
        entry: FileEntry {
            path: path.to_string(),
            content_hash: hash_bytes(content.as_bytes()),
            size: content.len() as u64,
            mod_time: 1_700_000_000,
            indexed_at: 1_700_000_100,
            language: None,
        },
        chunks: chunk(content, 60, 4096),
        analysis: FileAnalysis::default(),
    }
}

fn snapshot(files: Vec<IndexedFile>) -> Snapshot {
    let scan_hash = compute_scan_hash(
        files
            .iter()
            .map(|f| (f.entry.path.as_str(), f.entry.content_hash.as_str())),
    );
    Snapshot {
        root: "/work/repo".to_string(),
        scan_hash,
        started_at: Utc::now(),
        files,
    }
}

#[test]
fn test_store_creation() {
    let temp_dir = unique_temp_dir("store_creation");
    let db_path = temp_dir.path().join("index.db");

    let store = ContentStore::open(&db_path).unwrap();
    assert_eq!(store.path(), db_path.as_path());
    assert_eq!(store.stats().unwrap(), StoreStats::default());
    assert!(store.latest_scan().unwrap().is_none());
    assert!(store.indexed_paths().unwrap().is_empty());
}

#[test]
fn test_reopening_keeps_schema_and_rows() {
    let temp_dir = unique_temp_dir("store_reopen");
    let db_path = temp_dir.path().join("index.db");

    {
        let mut store = ContentStore::open(&db_path).unwrap();
        store
            .replace_snapshot(&snapshot(vec![indexed("a.txt", "alpha\n")]))
            .unwrap();
    }

    let store = ContentStore::open(&db_path).unwrap();
    assert_eq!(store.indexed_paths().unwrap(), vec!["a.txt"]);
    assert_eq!(store.stats().unwrap().total_scans, 1);
}

#[test]
fn test_replace_snapshot_inserts_everything() {
    let mut store = ContentStore::open_in_memory().unwrap();

    let mut login = indexed(
        "auth/login.go",
        "package auth\n\nfunc ValidatePassword(pw string) bool {\n\treturn check(pw)\n}\n",
    );
    login.analysis = FileAnalysis {
        symbols: vec![SymbolDef {
            name: "ValidatePassword".to_string(),
            kind: SymbolKind::Function,
            line_start: 3,
            line_end: 5,
        }],
        calls: vec![CallRef {
            target: "check".to_string(),
            line: 4,
        }],
    };
    let snap = snapshot(vec![login, indexed("README.md", "# Demo\n")]);

    let summary = store.replace_snapshot(&snap).unwrap();
    assert_eq!(summary.file_count, 2);
    assert_eq!(summary.chunk_count, 2);
    assert_eq!(summary.scan_hash, snap.scan_hash);
    assert_eq!(store.latest_scan().unwrap(), Some(summary));

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_chunks, 2);
    assert_eq!(stats.total_symbols, 1);
    assert_eq!(stats.total_calls, 1);

    let metadata = store.file_metadata().unwrap();
    let login_meta = &metadata["auth/login.go"];
    assert_eq!(login_meta.mod_time, 1_700_000_000);
    assert_eq!(login_meta.size, 74);

    let chunks = store.chunks_for_path("auth/login.go").unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 5));

    let file = store.get_file("README.md").unwrap().unwrap();
    assert_eq!(file.indexed_at, 1_700_000_100);
    assert!(store.get_file("nope.md").unwrap().is_none());
}

#[test]
fn test_replace_removes_previous_snapshot() {
    let mut store = ContentStore::open_in_memory().unwrap();

    let first = store
        .replace_snapshot(&snapshot(vec![
            indexed("old.txt", "stale words here\n"),
            indexed("kept.txt", "kept\n"),
        ]))
        .unwrap();
    let second = store
        .replace_snapshot(&snapshot(vec![indexed("kept.txt", "kept\n")]))
        .unwrap();

    assert!(second.id > first.id);
    assert_eq!(store.indexed_paths().unwrap(), vec!["kept.txt"]);
    assert!(store.chunks_for_path("old.txt").unwrap().is_empty());
    assert!(
        store.search_chunks("\"stale\"", 10).unwrap().is_empty(),
        "full-text rows of replaced files must be gone"
    );
    assert_eq!(store.stats().unwrap().total_scans, 2);
}

#[test]
fn test_failed_replace_keeps_prior_index() {
    let mut store = ContentStore::open_in_memory().unwrap();
    let original = store
        .replace_snapshot(&snapshot(vec![indexed("a.txt", "original content\n")]))
        .unwrap();

    // Duplicate primary key fails midway through the insert phase
    let broken = snapshot(vec![
        indexed("b.txt", "replacement\n"),
        indexed("b.txt", "replacement again\n"),
    ]);
    let result = store.replace_snapshot(&broken);
    assert!(matches!(result, Err(QuarryError::Store { .. })));

    assert_eq!(store.indexed_paths().unwrap(), vec!["a.txt"]);
    assert_eq!(store.latest_scan().unwrap(), Some(original));
    assert_eq!(store.stats().unwrap().total_scans, 1);
    let hits = store.search_chunks("\"original\"", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "a.txt");
}

#[test]
fn test_deleting_file_cascades() {
    let mut store = ContentStore::open_in_memory().unwrap();
    let mut file = indexed("main.go", "func main() {\n\trun()\n}\n");
    file.analysis.calls.push(CallRef {
        target: "run".to_string(),
        line: 2,
    });
    store.replace_snapshot(&snapshot(vec![file])).unwrap();

    store
        .conn
        .execute("DELETE FROM files WHERE path = 'main.go'", [])
        .unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.total_calls, 0);
}

#[test]
fn test_identifier_terms_make_camel_case_searchable() {
    let mut store = ContentStore::open_in_memory().unwrap();
    store
        .replace_snapshot(&snapshot(vec![indexed(
            "auth/login.go",
            "func ValidatePassword(pw string) bool {\n}\n",
        )]))
        .unwrap();

    let hits = store.search_chunks("\"password\"*", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].rank < 0.0, "bm25 ranks are negative, better is lower");
    assert!(hits[0].snippet.contains("ValidatePassword"));
}

#[test]
fn test_malformed_match_is_query_error() {
    let mut store = ContentStore::open_in_memory().unwrap();
    store
        .replace_snapshot(&snapshot(vec![indexed("a.txt", "text\n")]))
        .unwrap();

    let result = store.search_chunks("\"unterminated", 10);
    assert!(matches!(result, Err(QuarryError::Query(_))));
}

#[test]
fn test_enclosing_symbol_picks_narrowest() {
    let mut store = ContentStore::open_in_memory().unwrap();
    let mut file = indexed("svc.go", &"line\n".repeat(20));
    file.analysis.symbols = vec![
        SymbolDef {
            name: "Outer".to_string(),
            kind: SymbolKind::Function,
            line_start: 1,
            line_end: 20,
        },
        SymbolDef {
            name: "inner".to_string(),
            kind: SymbolKind::Method,
            line_start: 5,
            line_end: 10,
        },
        SymbolDef {
            name: "Config".to_string(),
            kind: SymbolKind::Struct,
            line_start: 6,
            line_end: 7,
        },
    ];
    store.replace_snapshot(&snapshot(vec![file])).unwrap();

    let at = |line| {
        store
            .enclosing_symbol("svc.go", line)
            .unwrap()
            .map(|s| s.name)
    };
    assert_eq!(at(6).as_deref(), Some("inner"), "structs never enclose calls");
    assert_eq!(at(15).as_deref(), Some("Outer"));
    assert_eq!(at(25), None);
}
