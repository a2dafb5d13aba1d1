use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::DEFAULT_CATEGORY;
use super::dates::{parse_date_value_in_year, timestamp_to_date, DateInput};

/// A single dated money movement with planned and actual figures.
///
/// `id` is positional: it is rewritten to the 1-based rank of the row every time the
/// ledger re-sorts, so it must not be kept as an external key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub plan_income: i64,
    #[serde(default)]
    pub plan_expense: i64,
    #[serde(default)]
    pub act_income: i64,
    #[serde(default)]
    pub act_expense: i64,
    /// Marks rows freshly inserted by the user; ignored by every calculation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            date: date.into(),
            description: description.into(),
            category: category.into(),
            plan_income: 0,
            plan_expense: 0,
            act_income: 0,
            act_expense: 0,
            is_new: false,
        }
    }

    pub fn with_plan(mut self, income: i64, expense: i64) -> Self {
        self.plan_income = income;
        self.plan_expense = expense;
        self
    }

    pub fn with_actual(mut self, income: i64, expense: i64) -> Self {
        self.act_income = income;
        self.act_expense = expense;
        self
    }

    /// Zero-valued placeholder sharing `date`, used when inserting next to an existing row.
    pub fn blank_on(date: impl Into<String>) -> Self {
        Self {
            is_new: true,
            ..Self::new(date, "", DEFAULT_CATEGORY)
        }
    }

    /// Parsed date, reading a yearless `D/M` as falling in `current_year`.
    pub fn timestamp(&self, current_year: i32) -> i64 {
        parse_date_value_in_year(DateInput::Text(&self.date), current_year)
    }

    /// Actual income when recorded, otherwise the planned figure.
    pub fn effective_income(&self) -> i64 {
        if self.act_income != 0 {
            self.act_income
        } else {
            self.plan_income
        }
    }

    /// Actual expense when recorded, otherwise the planned figure.
    pub fn effective_expense(&self) -> i64 {
        if self.act_expense != 0 {
            self.act_expense
        } else {
            self.plan_expense
        }
    }

    /// Raises any negative amount to zero.
    pub fn clamp_amounts(mut self) -> Self {
        for amount in [
            &mut self.plan_income,
            &mut self.plan_expense,
            &mut self.act_income,
            &mut self.act_expense,
        ] {
            *amount = (*amount).max(0);
        }
        self
    }

    pub fn has_actuals(&self) -> bool {
        self.act_income != 0 || self.act_expense != 0
    }

    pub fn apply(&mut self, change: FieldChange) {
        match change {
            FieldChange::Date(value) => self.date = value,
            FieldChange::Description(value) => self.description = value,
            FieldChange::Category(value) => self.category = value,
            FieldChange::PlanIncome(value) => self.plan_income = value,
            FieldChange::PlanExpense(value) => self.plan_expense = value,
            FieldChange::ActIncome(value) => self.act_income = value,
            FieldChange::ActExpense(value) => self.act_expense = value,
            FieldChange::IsNew(value) => self.is_new = value,
        }
    }

    pub fn merge(&mut self, patch: TransactionPatch) {
        patch
            .into_changes()
            .into_iter()
            .for_each(|change| self.apply(change));
    }
}

/// One field of a row together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Date(String),
    Description(String),
    Category(String),
    PlanIncome(i64),
    PlanExpense(i64),
    ActIncome(i64),
    ActExpense(i64),
    IsNew(bool),
}

impl FieldChange {
    /// Whether applying the change can move the row in date order.
    pub fn affects_order(&self) -> bool {
        matches!(self, FieldChange::Date(_))
    }
}

/// Several field changes applied to one row at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub date: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub plan_income: Option<i64>,
    pub plan_expense: Option<i64>,
    pub act_income: Option<i64>,
    pub act_expense: Option<i64>,
    pub is_new: Option<bool>,
}

impl TransactionPatch {
    pub fn affects_order(&self) -> bool {
        self.date.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn into_changes(self) -> Vec<FieldChange> {
        [
            self.date.map(FieldChange::Date),
            self.description.map(FieldChange::Description),
            self.category.map(FieldChange::Category),
            self.plan_income.map(FieldChange::PlanIncome),
            self.plan_expense.map(FieldChange::PlanExpense),
            self.act_income.map(FieldChange::ActIncome),
            self.act_expense.map(FieldChange::ActExpense),
            self.is_new.map(FieldChange::IsNew),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// A row annotated with its running balances. Derived on every read, never stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub est_balance: i64,
    pub act_balance: i64,
    pub difference: i64,
    /// Parsed date, resolved once when balances are derived.
    #[serde(skip)]
    pub timestamp: i64,
}

impl CalculatedTransaction {
    pub fn id(&self) -> u32 {
        self.transaction.id
    }

    pub fn date(&self) -> &str {
        &self.transaction.date
    }

    pub fn category(&self) -> &str {
        &self.transaction.category
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Calendar day of the row; `None` when its date is unreadable.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        timestamp_to_date(self.timestamp)
    }
}

impl AsRef<Transaction> for Transaction {
    fn as_ref(&self) -> &Transaction {
        self
    }
}

impl AsRef<Transaction> for CalculatedTransaction {
    fn as_ref(&self) -> &Transaction {
        &self.transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_amounts_prefer_actuals() {
        let planned_only = Transaction::new("01/01/2026", "Gaji", "Pemasukan").with_plan(1000, 0);
        assert_eq!(planned_only.effective_income(), 1000);

        let with_actual = Transaction::new("02/01/2026", "Listrik", "Tagihan")
            .with_plan(0, 200)
            .with_actual(0, 300);
        assert_eq!(with_actual.effective_expense(), 300);
        assert_eq!(with_actual.effective_income(), 0);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut txn = Transaction::new("01/01/2026", "Pasar", "Kebutuhan Pokok").with_plan(0, 50);
        txn.merge(TransactionPatch {
            description: Some("Pasar pagi".into()),
            act_expense: Some(45),
            ..TransactionPatch::default()
        });
        assert_eq!(txn.description, "Pasar pagi");
        assert_eq!(txn.plan_expense, 50);
        assert_eq!(txn.act_expense, 45);
        assert_eq!(txn.date, "01/01/2026");
    }

    #[test]
    fn records_use_camel_case_on_the_wire() {
        let txn = Transaction::new("01/01/2026", "Gaji", "Pemasukan").with_plan(1000, 0);
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["planIncome"], 1000);
        assert!(json.get("isNew").is_none());

        let parsed: Transaction =
            serde_json::from_str(r#"{"id":3,"date":"02/01/2026","description":"x","planExpense":5}"#)
                .unwrap();
        assert_eq!(parsed.category, DEFAULT_CATEGORY);
        assert_eq!(parsed.plan_expense, 5);
    }
}
