#![allow(dead_code)]

use boostme::storage::{DatabaseUrl, PoolOptions, Storage};
use std::sync::Once;
use tempfile::TempDir;

pub mod cli;
pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        boostme::logging::init_test_logging();
    });
}

pub fn test_db() -> Storage {
    init_test_logging();
    Storage::open_memory().expect("Failed to create test database")
}

pub fn test_db_with_dir() -> (Storage, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = DatabaseUrl::File(dir.path().join("data").join("boostme.db"));
    let storage = Storage::open(&url, &PoolOptions::default()).expect("Failed to create test database");
    (storage, dir)
}
