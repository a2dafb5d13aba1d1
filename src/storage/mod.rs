pub mod json_backend;
pub mod library;
pub mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::errors::LedgerError;
use crate::ledger::{Category, CategoryBudget, Transaction};

pub type Result<T> = std::result::Result<T, LedgerError>;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BUDGETS_KEY: &str = "budgets";
pub const CATEGORIES_KEY: &str = "categories";
pub const SAVED_FILES_KEY: &str = "saved_files";

/// Abstraction over the places ledger state can be kept.
///
/// Loads never fail on malformed content: a document that cannot be decoded reads
/// as empty. Only I/O failures surface as errors.
pub trait StorageBackend: Send + Sync {
    fn load_transactions(&self) -> Result<Vec<Transaction>>;
    fn save_transactions(&self, records: &[Transaction]) -> Result<()>;
    fn clear_transactions(&self) -> Result<()>;

    fn load_budgets(&self) -> Result<Vec<CategoryBudget>>;
    fn save_budgets(&self, budgets: &[CategoryBudget]) -> Result<()>;

    fn load_categories(&self) -> Result<Vec<Category>>;
    fn save_categories(&self, categories: &[Category]) -> Result<()>;

    fn load_saved_files(&self) -> Result<Vec<SavedFile>>;
    fn save_saved_files(&self, files: &[SavedFile]) -> Result<()>;
}

impl<S: StorageBackend + ?Sized> StorageBackend for Arc<S> {
    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        (**self).load_transactions()
    }

    fn save_transactions(&self, records: &[Transaction]) -> Result<()> {
        (**self).save_transactions(records)
    }

    fn clear_transactions(&self) -> Result<()> {
        (**self).clear_transactions()
    }

    fn load_budgets(&self) -> Result<Vec<CategoryBudget>> {
        (**self).load_budgets()
    }

    fn save_budgets(&self, budgets: &[CategoryBudget]) -> Result<()> {
        (**self).save_budgets(budgets)
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        (**self).load_categories()
    }

    fn save_categories(&self, categories: &[Category]) -> Result<()> {
        (**self).save_categories(categories)
    }

    fn load_saved_files(&self) -> Result<Vec<SavedFile>> {
        (**self).load_saved_files()
    }

    fn save_saved_files(&self, files: &[SavedFile]) -> Result<()> {
        (**self).save_saved_files(files)
    }
}

/// Decodes a stored document, falling back to the empty value when it is not valid
/// UTF-8 JSON of the expected shape.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(key: &str, data: &[u8]) -> T {
    match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "stored document is malformed; treating it as empty");
            T::default()
        }
    }
}

pub use json_backend::JsonStorage;
pub use library::{SavedFile, SavedFileLibrary};
pub use memory::MemoryStorage;
