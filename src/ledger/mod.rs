//! Ledger rows, their ordering and history, plus the category and budget tables.

pub mod budget;
pub mod category;
pub mod dates;
pub mod history;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod transaction;

pub use budget::{BudgetBook, CategoryBudget};
pub use category::{Category, CategoryCatalog, ColorPreset, COLOR_PRESETS};
pub use dates::{DateRange, INVALID_DATE};
pub use history::{History, TrackedLedger, DEFAULT_HISTORY_DEPTH};
pub use ledger::{InsertPosition, Ledger};
pub use transaction::{CalculatedTransaction, FieldChange, Transaction, TransactionPatch};
