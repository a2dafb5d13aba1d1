use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    core::time::{Clock, SystemClock},
    errors::LedgerError,
    ledger::{Category, CategoryBudget, Transaction},
    utils::paths::{backup_dir_in, ensure_dir, resolve_base, store_dir_in},
};

use super::{
    decode_or_default, Result, SavedFile, StorageBackend, BUDGETS_KEY, CATEGORIES_KEY,
    SAVED_FILES_KEY, TRANSACTIONS_KEY,
};

const DOCUMENT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Keeps each collection as a pretty-printed JSON document under `<root>/store`.
///
/// Before the transactions document is overwritten its previous content is copied
/// to `<root>/backups`, keeping the newest `retention` copies.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    store_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    clock: Arc<dyn Clock>,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = resolve_base(root);
        let store_dir = store_dir_in(&root);
        let backups_dir = backup_dir_in(&root);
        ensure_dir(&store_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            store_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
            clock: Arc::new(SystemClock),
        })
    }

    /// Stamps backup names with `clock` instead of the system time.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(format!("{key}.{DOCUMENT_EXTENSION}"))
    }

    /// Transaction backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        // Timestamps are fixed width, so name order is age order.
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    /// Copies a backup over the live transactions document and returns its rows.
    pub fn restore_backup(&self, backup_name: &str) -> Result<Vec<Transaction>> {
        let backup_path = self.backups_dir.join(backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Storage(format!(
                "backup `{backup_name}` not found"
            )));
        }
        let target = self.document_path(TRANSACTIONS_KEY);
        fs::copy(&backup_path, &target)?;
        self.read_document(TRANSACTIONS_KEY)
    }

    fn read_document<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(T::default());
        }
        let data = fs::read(&path)?;
        Ok(decode_or_default(key, &data))
    }

    fn write_document<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.document_path(key);
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(&path, &json)?;
        debug!(path = %path.display(), "document saved");
        Ok(())
    }

    fn backup_existing_transactions(&self) -> Result<()> {
        let path = self.document_path(TRANSACTIONS_KEY);
        if !path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let backup_path = self.next_backup_path();
        fs::copy(&path, &backup_path)?;
        self.prune_backups()
    }

    /// `transactions_<timestamp>.json`, with `_<n>` appended when that name is taken.
    fn next_backup_path(&self) -> PathBuf {
        let timestamp = self.clock.now().format(BACKUP_TIMESTAMP_FORMAT);
        let stem = format!("{TRANSACTIONS_KEY}_{timestamp}");
        let mut candidate = self.backups_dir.join(format!("{stem}.{DOCUMENT_EXTENSION}"));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self
                .backups_dir
                .join(format!("{stem}_{counter}.{DOCUMENT_EXTENSION}"));
            counter += 1;
        }
        candidate
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for name in backups.iter().skip(self.retention) {
            let path = self.backups_dir.join(name);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "could not prune old backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        self.read_document(TRANSACTIONS_KEY)
    }

    fn save_transactions(&self, records: &[Transaction]) -> Result<()> {
        self.backup_existing_transactions()?;
        self.write_document(TRANSACTIONS_KEY, records)
    }

    fn clear_transactions(&self) -> Result<()> {
        let path = self.document_path(TRANSACTIONS_KEY);
        if path.exists() {
            self.backup_existing_transactions()?;
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn load_budgets(&self) -> Result<Vec<CategoryBudget>> {
        self.read_document(BUDGETS_KEY)
    }

    fn save_budgets(&self, budgets: &[CategoryBudget]) -> Result<()> {
        self.write_document(BUDGETS_KEY, budgets)
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        self.read_document(CATEGORIES_KEY)
    }

    fn save_categories(&self, categories: &[Category]) -> Result<()> {
        self.write_document(CATEGORIES_KEY, categories)
    }

    fn load_saved_files(&self) -> Result<Vec<SavedFile>> {
        self.read_document(SAVED_FILES_KEY)
    }

    fn save_saved_files(&self, files: &[SavedFile]) -> Result<()> {
        self.write_document(SAVED_FILES_KEY, files)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes to a sibling temp file and renames it over `path`.
fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
