use serde::{Deserialize, Serialize};

use super::transaction::{FieldChange, Transaction, TransactionPatch};

/// Where a new row goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Above,
    Below,
}

/// The ordered collection of rows.
///
/// Rows are kept sorted ascending by parsed date and every row's `id` equals its
/// 1-based position. Each mutating method restores both properties before it
/// returns and reports whether anything changed; a call naming an unknown id is
/// a silent no-op. Yearless `D/M` dates sort as if they fell in `current_year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    current_year: i32,
}

impl Ledger {
    pub fn new(current_year: i32) -> Self {
        Self {
            transactions: Vec::new(),
            current_year,
        }
    }

    /// Adopts `records` as the ledger, sorting and renumbering them.
    pub fn from_transactions(records: Vec<Transaction>, current_year: i32) -> Self {
        let mut ledger = Self {
            transactions: records,
            current_year,
        };
        ledger.normalize();
        ledger
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Transaction> {
        self.position(id).map(|idx| &self.transactions[idx])
    }

    pub fn add(&mut self, record: Transaction) -> bool {
        self.transactions.push(record);
        self.normalize();
        true
    }

    pub fn update_field(&mut self, id: u32, change: FieldChange) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let reorder = change.affects_order();
        self.transactions[idx].apply(change);
        if reorder {
            self.normalize();
        }
        true
    }

    pub fn update_row(&mut self, id: u32, patch: TransactionPatch) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let reorder = patch.affects_order();
        self.transactions[idx].merge(patch);
        if reorder {
            self.normalize();
        }
        true
    }

    pub fn delete(&mut self, id: u32) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.transactions.remove(idx);
        self.normalize();
        true
    }

    /// Inserts a blank row dated like the anchor, directly above or below it.
    pub fn insert_adjacent(&mut self, anchor_id: u32, position: InsertPosition) -> bool {
        let Some(idx) = self.position(anchor_id) else {
            return false;
        };
        let row = Transaction::blank_on(self.transactions[idx].date.clone());
        let at = match position {
            InsertPosition::Above => idx,
            InsertPosition::Below => idx + 1,
        };
        self.transactions.insert(at, row);
        self.normalize();
        true
    }

    /// Swaps in a whole new set of rows (file open, import, undo).
    pub fn replace_all(&mut self, records: Vec<Transaction>) {
        self.transactions = records;
        self.normalize();
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.transactions.iter().position(|txn| txn.id == id)
    }

    /// Stable sort by parsed date, then renumber from 1. Rows sharing a date keep
    /// their relative order, which is what lets an inserted row stay next to its anchor.
    fn normalize(&mut self) {
        let year = self.current_year;
        self.transactions.sort_by_cached_key(|txn| txn.timestamp(year));
        for (idx, txn) in self.transactions.iter_mut().enumerate() {
            txn.id = idx as u32 + 1;
        }
    }
}
