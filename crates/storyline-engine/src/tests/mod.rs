//! Shared helpers for unit tests.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn create_test_manuscripts_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}
