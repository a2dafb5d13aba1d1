//! Linear undo/redo over full ledger snapshots.

use std::collections::VecDeque;

use tracing::debug;

use super::ledger::{InsertPosition, Ledger};
use super::transaction::{FieldChange, Transaction, TransactionPatch};

/// Number of snapshots retained when no other depth is configured.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Bounded stack of ledger snapshots with a cursor at the visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    snapshots: VecDeque<Vec<Transaction>>,
    cursor: usize,
    depth: usize,
}

impl History {
    /// Starts a history whose only entry is `initial`.
    pub fn new(initial: Vec<Transaction>, depth: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(depth.max(1));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            depth: depth.max(1),
        }
    }

    /// Records a committed state. Redo entries past the cursor are dropped, and the
    /// oldest entries are evicted once the depth is exceeded.
    pub fn record(&mut self, snapshot: Vec<Transaction>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.depth {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Steps back one snapshot and returns it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&[Transaction]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor).map(Vec::as_slice)
    }

    /// Steps forward one snapshot and returns it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&[Transaction]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor).map(Vec::as_slice)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Drops every entry and starts over from `initial`.
    pub fn reset(&mut self, initial: Vec<Transaction>) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// A [`Ledger`] whose structural mutations are all captured in a [`History`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedLedger {
    ledger: Ledger,
    history: History,
}

impl TrackedLedger {
    /// Adopts `records` as the starting state; the first snapshot is taken after sorting.
    pub fn new(records: Vec<Transaction>, depth: usize, current_year: i32) -> Self {
        let ledger = Ledger::from_transactions(records, current_year);
        let history = History::new(ledger.transactions().to_vec(), depth);
        Self { ledger, history }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn add(&mut self, record: Transaction) -> bool {
        let changed = self.ledger.add(record);
        self.commit(changed, "add")
    }

    pub fn update_field(&mut self, id: u32, change: FieldChange) -> bool {
        let changed = self.ledger.update_field(id, change);
        self.commit(changed, "update_field")
    }

    pub fn update_row(&mut self, id: u32, patch: TransactionPatch) -> bool {
        let changed = self.ledger.update_row(id, patch);
        self.commit(changed, "update_row")
    }

    pub fn delete(&mut self, id: u32) -> bool {
        let changed = self.ledger.delete(id);
        self.commit(changed, "delete")
    }

    pub fn insert_adjacent(&mut self, anchor_id: u32, position: InsertPosition) -> bool {
        let changed = self.ledger.insert_adjacent(anchor_id, position);
        self.commit(changed, "insert_adjacent")
    }

    /// Replaces every row; undoable like any other mutation.
    pub fn replace_all(&mut self, records: Vec<Transaction>) -> bool {
        self.ledger.replace_all(records);
        self.commit(true, "replace_all")
    }

    /// Empties the ledger and forgets all history.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.history.reset(Vec::new());
        debug!("ledger reset");
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                let year = self.ledger.current_year();
                self.ledger = Ledger::from_transactions(snapshot.to_vec(), year);
                debug!(rows = self.ledger.len(), "undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                let year = self.ledger.current_year();
                self.ledger = Ledger::from_transactions(snapshot.to_vec(), year);
                debug!(rows = self.ledger.len(), "redo");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit(&mut self, changed: bool, operation: &str) -> bool {
        if changed {
            self.history.record(self.ledger.transactions().to_vec());
            debug!(operation, rows = self.ledger.len(), "ledger mutation committed");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, description: &str) -> Transaction {
        Transaction::new(date, description, "Lainnya").with_plan(0, 10)
    }

    fn tracked() -> TrackedLedger {
        TrackedLedger::new(Vec::new(), DEFAULT_HISTORY_DEPTH, 2026)
    }

    #[test]
    fn n_mutations_then_n_undos_restore_start() {
        let mut tracked = TrackedLedger::new(vec![row("01/01/2026", "seed")], 50, 2026);
        let initial = tracked.transactions().to_vec();

        tracked.add(row("05/01/2026", "x"));
        tracked.update_field(1, FieldChange::Description("renamed".into()));
        tracked.insert_adjacent(2, InsertPosition::Below);
        tracked.delete(1);

        for _ in 0..4 {
            assert!(tracked.undo());
        }
        assert_eq!(tracked.transactions(), initial.as_slice());
        assert!(!tracked.can_undo());
        assert!(!tracked.undo());
    }

    #[test]
    fn redo_restores_pre_undo_state() {
        let mut tracked = tracked();
        tracked.add(row("01/01/2026", "a"));
        tracked.add(row("02/01/2026", "b"));
        let latest = tracked.transactions().to_vec();

        assert!(tracked.undo());
        assert!(tracked.can_redo());
        assert!(tracked.redo());
        assert_eq!(tracked.transactions(), latest.as_slice());
        assert!(!tracked.redo());
    }

    #[test]
    fn new_mutation_after_undo_discards_redo() {
        let mut tracked = tracked();
        tracked.add(row("01/01/2026", "a"));
        tracked.add(row("02/01/2026", "b"));
        tracked.undo();
        tracked.add(row("03/01/2026", "c"));
        assert!(!tracked.can_redo());
        assert_eq!(tracked.history().len(), 3);
    }

    #[test]
    fn no_op_mutations_leave_history_alone() {
        let mut tracked = tracked();
        tracked.add(row("01/01/2026", "a"));
        assert!(!tracked.delete(99));
        assert_eq!(tracked.history().len(), 2);
    }

    #[test]
    fn depth_bound_evicts_oldest() {
        let mut history = History::new(Vec::new(), 3);
        for idx in 0..5 {
            history.record(vec![row("01/01/2026", &idx.to_string())]);
        }
        assert_eq!(history.len(), 3);
        assert!(history.undo().is_some());
        let oldest = history.undo().map(<[Transaction]>::to_vec).unwrap();
        assert_eq!(oldest[0].description, "2");
        assert!(!history.can_undo());
    }

    #[test]
    fn reset_clears_history() {
        let mut tracked = tracked();
        tracked.add(row("01/01/2026", "a"));
        tracked.reset();
        assert!(tracked.transactions().is_empty());
        assert!(!tracked.can_undo());
        assert!(!tracked.can_redo());
    }
}
