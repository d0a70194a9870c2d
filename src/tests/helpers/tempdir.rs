/// Test helper for creating unique temporary directories
///
/// Prevents parallel test conflicts by ensuring each test gets a unique temp directory
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create a uniquely named temporary directory for parallel test execution
pub fn unique_temp_dir(test_name: &str) -> TempDir {
    let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let unique_name = format!("quarry_test_{}_{}", test_name, counter);

    tempfile::Builder::new()
        .prefix(&unique_name)
        .tempdir()
        .expect("Failed to create unique temp directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_temp_dir_names_contain_test_name() {
        let first = unique_temp_dir("my_awesome_test");
        let second = unique_temp_dir("my_awesome_test");

        assert_ne!(first.path(), second.path());
        assert!(
            first
                .path()
                .to_string_lossy()
                .contains("quarry_test_my_awesome_test"),
            "Temp dir name should contain test name: {:?}",
            first.path()
        );
    }
}
