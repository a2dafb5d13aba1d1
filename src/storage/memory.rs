use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    errors::LedgerError,
    ledger::{Category, CategoryBudget, Transaction},
};

use super::{
    decode_or_default, Result, SavedFile, StorageBackend, BUDGETS_KEY, CATEGORIES_KEY,
    SAVED_FILES_KEY, TRANSACTIONS_KEY,
};

/// In-process key-value store holding each collection as a JSON string.
///
/// Writes can be switched to fail, which lets callers exercise their
/// failed-save paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with raw text, bypassing serialization.
    pub fn insert_raw(&self, key: &str, data: impl Into<String>) -> Result<()> {
        self.lock()?.insert(key.to_string(), data.into());
        Ok(())
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().ok()?.get(key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.documents
            .lock()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".into()))
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self
            .lock()?
            .get(key)
            .map(|data| decode_or_default(key, data.as_bytes()))
            .unwrap_or_default())
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage(format!("write to `{key}` rejected")));
        }
        let json = serde_json::to_string(value)?;
        self.lock()?.insert(key.to_string(), json);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        self.read(TRANSACTIONS_KEY)
    }

    fn save_transactions(&self, records: &[Transaction]) -> Result<()> {
        self.write(TRANSACTIONS_KEY, records)
    }

    fn clear_transactions(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage("clear rejected".into()));
        }
        self.lock()?.remove(TRANSACTIONS_KEY);
        Ok(())
    }

    fn load_budgets(&self) -> Result<Vec<CategoryBudget>> {
        self.read(BUDGETS_KEY)
    }

    fn save_budgets(&self, budgets: &[CategoryBudget]) -> Result<()> {
        self.write(BUDGETS_KEY, budgets)
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        self.read(CATEGORIES_KEY)
    }

    fn save_categories(&self, categories: &[Category]) -> Result<()> {
        self.write(CATEGORIES_KEY, categories)
    }

    fn load_saved_files(&self) -> Result<Vec<SavedFile>> {
        self.read(SAVED_FILES_KEY)
    }

    fn save_saved_files(&self, files: &[SavedFile]) -> Result<()> {
        self.write(SAVED_FILES_KEY, files)
    }
}
