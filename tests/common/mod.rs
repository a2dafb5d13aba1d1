#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cashflow_core::{
    config::{Config, ConfigManager},
    core::{ledger_manager::LedgerManager, time::FixedClock},
    ledger::Transaction,
    storage::{JsonStorage, MemoryStorage},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Thursday, 12 March 2026.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 12).expect("valid date")
}

pub fn clock() -> FixedClock {
    FixedClock::on(today())
}

/// A fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (LedgerManager, ConfigManager) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.join("data")), Some(3)).expect("create json storage");
    let ledger_manager = LedgerManager::new(Box::new(storage), Box::new(clock()));
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (ledger_manager, config_manager)
}

/// Manager over in-memory storage; the storage handle stays with the caller.
pub fn memory_manager() -> (LedgerManager, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let manager = LedgerManager::new(Box::new(storage.clone()), Box::new(clock()));
    (manager, storage)
}

/// Config whose ledger documents live in a private temp directory.
pub fn temp_config() -> Config {
    Config {
        storage_dir: Some(temp_base()),
        ..Config::default()
    }
}

pub fn row(date: &str, description: &str, category: &str) -> Transaction {
    Transaction::new(date, description, category)
}
