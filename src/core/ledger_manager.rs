use std::io::{Read, Write};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{self, spreadsheet};
use crate::config::Config;
use crate::core::services::analytics_service::AnalyticsReport;
use crate::core::services::budget_service::BudgetMonthReport;
use crate::core::services::filter_service::{GroupBy, TransactionFilter, TransactionGroup};
use crate::core::services::summary_service::{ExportSelection, LedgerTotals, MonthlyTotals};
use crate::core::services::{
    AnalyticsService, BalanceService, BudgetService, FilterService, ServiceError, ServiceResult,
    SummaryService,
};
use crate::core::time::{Clock, SystemClock};
use crate::currency::MoneyFormat;
use crate::errors::LedgerError;
use crate::ledger::{
    BudgetBook, CalculatedTransaction, Category, CategoryCatalog, FieldChange, InsertPosition,
    TrackedLedger, Transaction, TransactionPatch,
};
use crate::storage::{JsonStorage, SavedFile, SavedFileLibrary, StorageBackend};

/// How much state a [`LedgerManager::load`] brought back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub transactions: usize,
    pub budgets: usize,
    pub categories: usize,
    pub saved_files: usize,
}

/// Facade that coordinates ledger state, history, persistence and the derived views.
///
/// Every committed mutation is written through to storage straight away. When that
/// write fails the call returns the error, but the in-memory change stays applied
/// and remains undoable.
pub struct LedgerManager {
    ledger: TrackedLedger,
    budgets: BudgetBook,
    categories: CategoryCatalog,
    library: SavedFileLibrary,
    filter: TransactionFilter,
    money: MoneyFormat,
    heatmap_weeks: u32,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
}

impl LedgerManager {
    pub fn new(storage: Box<dyn StorageBackend>, clock: Box<dyn Clock>) -> Self {
        Self::with_config(storage, clock, &Config::default())
    }

    pub fn with_config(
        storage: Box<dyn StorageBackend>,
        clock: Box<dyn Clock>,
        config: &Config,
    ) -> Self {
        let year = clock.today().year();
        Self {
            ledger: TrackedLedger::new(Vec::new(), config.history_depth, year),
            budgets: BudgetBook::default(),
            categories: CategoryCatalog::default(),
            library: SavedFileLibrary::default(),
            filter: TransactionFilter::default(),
            money: MoneyFormat::new(&config.locale, &config.currency),
            heatmap_weeks: config.heatmap_weeks,
            storage,
            clock,
        }
    }

    /// JSON storage under the configured directory, the system clock, state loaded.
    pub fn open(config: &Config) -> Result<Self, LedgerError> {
        let storage = JsonStorage::new(config.storage_dir.clone(), None)?;
        let mut manager = Self::with_config(Box::new(storage), Box::new(SystemClock), config);
        manager.load()?;
        Ok(manager)
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Replaces all in-memory state with what storage holds and starts a fresh history.
    pub fn load(&mut self) -> Result<LoadSummary, LedgerError> {
        let transactions = self.storage.load_transactions()?;
        let budgets = self.storage.load_budgets()?;
        let categories = self.storage.load_categories()?;
        let saved_files = self.storage.load_saved_files()?;

        let summary = LoadSummary {
            transactions: transactions.len(),
            budgets: budgets.len(),
            categories: categories.len(),
            saved_files: saved_files.len(),
        };
        let depth = self.ledger.history().depth();
        self.ledger = TrackedLedger::new(transactions, depth, self.clock.today().year());
        self.budgets = BudgetBook::new(budgets);
        self.categories = CategoryCatalog::new(categories);
        self.library = SavedFileLibrary::new(saved_files);
        info!(
            transactions = summary.transactions,
            budgets = summary.budgets,
            "ledger state loaded"
        );
        Ok(summary)
    }

    // Transactions

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn add(&mut self, record: Transaction) -> ServiceResult<bool> {
        let changed = self.ledger.add(record);
        self.persist_transactions(changed)
    }

    pub fn update_field(&mut self, id: u32, change: FieldChange) -> ServiceResult<bool> {
        let changed = self.ledger.update_field(id, change);
        self.persist_transactions(changed)
    }

    pub fn update_row(&mut self, id: u32, patch: TransactionPatch) -> ServiceResult<bool> {
        let changed = self.ledger.update_row(id, patch);
        self.persist_transactions(changed)
    }

    pub fn delete(&mut self, id: u32) -> ServiceResult<bool> {
        let changed = self.ledger.delete(id);
        self.persist_transactions(changed)
    }

    pub fn insert_adjacent(&mut self, anchor_id: u32, position: InsertPosition) -> ServiceResult<bool> {
        let changed = self.ledger.insert_adjacent(anchor_id, position);
        self.persist_transactions(changed)
    }

    /// Adopts `records` as the whole ledger (file open, import).
    pub fn replace_all(&mut self, records: Vec<Transaction>) -> ServiceResult<bool> {
        let changed = self.ledger.replace_all(records);
        self.persist_transactions(changed)
    }

    /// Empties the ledger, forgets the history and clears stored transactions.
    pub fn reset(&mut self) -> ServiceResult<()> {
        self.ledger.reset();
        self.storage.clear_transactions().map_err(|err| {
            warn!(error = %err, "clearing stored transactions failed");
            ServiceError::from(err)
        })
    }

    pub fn undo(&mut self) -> ServiceResult<bool> {
        let changed = self.ledger.undo();
        self.persist_transactions(changed)
    }

    pub fn redo(&mut self) -> ServiceResult<bool> {
        let changed = self.ledger.redo();
        self.persist_transactions(changed)
    }

    pub fn can_undo(&self) -> bool {
        self.ledger.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.ledger.can_redo()
    }

    // Import / export

    pub fn import_csv<R: Read>(&mut self, reader: R) -> ServiceResult<usize> {
        let records = spreadsheet::import_csv(reader)?;
        self.import(records)
    }

    pub fn import_json<R: Read>(&mut self, reader: R) -> ServiceResult<usize> {
        let records = codec::import_json(reader)?;
        self.import(records)
    }

    /// Writes the rows currently visible through the filter.
    pub fn export_csv<W: Write>(&self, writer: W) -> ServiceResult<()> {
        Ok(spreadsheet::export_csv(writer, &self.filtered())?)
    }

    pub fn export_json<W: Write>(&self, writer: W) -> ServiceResult<()> {
        Ok(codec::export_json(writer, self.transactions())?)
    }

    pub fn available_months(&self) -> Vec<String> {
        SummaryService::available_months(&self.calculated())
    }

    pub fn export_selection(&self, months: &[String]) -> ExportSelection {
        SummaryService::select_months(&self.calculated(), months)
    }

    // Derived views

    pub fn calculated(&self) -> Vec<CalculatedTransaction> {
        BalanceService::calculate(self.transactions(), self.ledger.ledger().current_year())
    }

    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: TransactionFilter) {
        self.filter = filter;
    }

    /// Currency and locale used for rendering amounts and matching searches.
    pub fn money_format(&self) -> &MoneyFormat {
        &self.money
    }

    /// Renders `amount` in the configured currency and locale.
    pub fn format_amount(&self, amount: i64) -> String {
        self.money.format(amount)
    }

    pub fn filtered(&self) -> Vec<CalculatedTransaction> {
        FilterService::filter(&self.calculated(), &self.filter, &self.money)
    }

    pub fn grouped(&self, by: GroupBy) -> Vec<TransactionGroup> {
        FilterService::group(&self.filtered(), by)
    }

    pub fn totals(&self) -> LedgerTotals {
        let calculated = self.calculated();
        let visible = FilterService::filter(&calculated, &self.filter, &self.money);
        SummaryService::totals(&calculated, &visible)
    }

    pub fn current_month_totals(&self) -> MonthlyTotals {
        SummaryService::current_month_totals(&self.calculated(), self.clock.as_ref())
    }

    pub fn transactions_on(&self, day: NaiveDate) -> Vec<CalculatedTransaction> {
        SummaryService::transactions_on(&self.calculated(), day)
    }

    pub fn analytics(&self) -> AnalyticsReport {
        let calculated = self.calculated();
        let visible = FilterService::filter(&calculated, &self.filter, &self.money);
        AnalyticsService::compute(
            &visible,
            &calculated,
            &self.filter.date_range,
            self.clock.as_ref(),
        )
    }

    /// Heatmap cells for the configured trailing window, oldest day first.
    pub fn heatmap_days(&self, report: &AnalyticsReport) -> Vec<(NaiveDate, i64)> {
        report
            .heatmap
            .trailing(self.clock.today(), self.heatmap_weeks)
    }

    // Budgets

    pub fn budgets(&self) -> &BudgetBook {
        &self.budgets
    }

    /// Budget label of the clock's current month.
    pub fn current_budget_month(&self) -> String {
        BudgetService::month_of(self.clock.today())
    }

    pub fn budget_report(&self, month_year: &str) -> BudgetMonthReport {
        BudgetService::month_report(
            &self.budgets,
            &self.categories,
            &self.calculated(),
            month_year,
        )
    }

    pub fn set_budget(&mut self, category: &str, month_year: &str, limit: i64) -> ServiceResult<()> {
        BudgetService::set_limit(&mut self.budgets, category, month_year, limit)?;
        self.persist_budgets()
    }

    pub fn reset_budget_month(&mut self, month_year: &str) -> ServiceResult<bool> {
        if !self.budgets.reset_month(month_year) {
            return Ok(false);
        }
        self.persist_budgets()?;
        Ok(true)
    }

    // Categories

    pub fn categories(&self) -> &CategoryCatalog {
        &self.categories
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> ServiceResult<()> {
        if name.trim().is_empty() {
            return Err(ServiceError::Invalid("category name is required".into()));
        }
        if !self.categories.add_custom(name, color) {
            return Err(ServiceError::Invalid(format!(
                "category `{}` already exists",
                name.trim()
            )));
        }
        self.persist_categories()
    }

    pub fn remove_category(&mut self, name: &str) -> ServiceResult<bool> {
        if !self.categories.remove_custom(name) {
            return Ok(false);
        }
        self.persist_categories()?;
        Ok(true)
    }

    // Saved files

    pub fn saved_files(&self) -> &[SavedFile] {
        self.library.files()
    }

    /// Stores the current rows under `name` and returns the saved file's id.
    pub fn save_file(&mut self, name: &str) -> ServiceResult<Uuid> {
        let saved_at = self.clock.now();
        let rows = self.transactions().to_vec();
        let id = self.library.save(name, saved_at, rows)?.id;
        self.persist_library()?;
        Ok(id)
    }

    /// Loads a saved file into the ledger; `false` when the id is unknown.
    pub fn open_saved_file(&mut self, id: Uuid) -> ServiceResult<bool> {
        let Some(file) = self.library.get(id) else {
            return Ok(false);
        };
        let rows = file.data.clone();
        self.replace_all(rows)
    }

    pub fn delete_saved_file(&mut self, id: Uuid) -> ServiceResult<bool> {
        if !self.library.delete(id) {
            return Ok(false);
        }
        self.persist_library()?;
        Ok(true)
    }

    fn import(&mut self, records: Vec<Transaction>) -> ServiceResult<usize> {
        let count = records.len();
        self.replace_all(records)?;
        debug!(rows = count, "rows imported");
        Ok(count)
    }

    fn persist_transactions(&self, changed: bool) -> ServiceResult<bool> {
        if changed {
            let result = self.storage.save_transactions(self.transactions());
            report_save("transactions", result)?;
        }
        Ok(changed)
    }

    fn persist_budgets(&self) -> ServiceResult<()> {
        report_save("budgets", self.storage.save_budgets(self.budgets.entries()))
    }

    fn persist_categories(&self) -> ServiceResult<()> {
        let custom: &[Category] = self.categories.custom();
        report_save("categories", self.storage.save_categories(custom))
    }

    fn persist_library(&self) -> ServiceResult<()> {
        report_save("saved_files", self.storage.save_saved_files(self.library.files()))
    }
}

fn report_save(document: &str, result: Result<(), LedgerError>) -> ServiceResult<()> {
    result.map_err(|err| {
        warn!(document, error = %err, "save failed; in-memory state kept");
        ServiceError::from(err)
    })
}
