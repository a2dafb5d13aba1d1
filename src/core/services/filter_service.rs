use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::currency::MoneyFormat;
use crate::ledger::dates::{month_year_label, DateRange};
use crate::ledger::{CalculatedTransaction, Transaction};

/// Category filter value that lets every category through.
pub const ALL_CATEGORIES: &str = "All";

/// Group key for rows whose date cannot be read.
pub const UNDATED_GROUP: &str = "Tanpa Tanggal";

/// The three independent predicates applied to the calculated ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub search_text: String,
    pub category: String,
    pub date_range: DateRange,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            category: ALL_CATEGORIES.to_string(),
            date_range: DateRange::default(),
        }
    }
}

impl TransactionFilter {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.category == ALL_CATEGORIES
            && self.date_range.is_open()
    }
}

/// How the filtered rows are segmented for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Month,
    Category,
}

/// One display segment with its effective income and expense sums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionGroup {
    pub key: String,
    pub rows: Vec<CalculatedTransaction>,
    pub income: i64,
    pub expense: i64,
}

pub struct FilterService;

impl FilterService {
    /// Rows passing all three predicates. Amounts are also searched as rendered by `money`.
    pub fn filter(
        calculated: &[CalculatedTransaction],
        filter: &TransactionFilter,
        money: &MoneyFormat,
    ) -> Vec<CalculatedTransaction> {
        let query = filter.search_text.trim().to_lowercase();
        calculated
            .iter()
            .filter(|row| query.is_empty() || matches_search(&row.transaction, &query, money))
            .filter(|row| filter.category == ALL_CATEGORIES || row.category() == filter.category)
            .filter(|row| filter.date_range.is_open() || filter.date_range.contains(row.timestamp()))
            .cloned()
            .collect()
    }

    /// Partitions `rows` by month label or category, keys in order of first appearance.
    pub fn group(rows: &[CalculatedTransaction], by: GroupBy) -> Vec<TransactionGroup> {
        let mut groups: Vec<TransactionGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in rows {
            let key = group_key(row, by);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(TransactionGroup {
                    key,
                    rows: Vec::new(),
                    income: 0,
                    expense: 0,
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.income = group.income.saturating_add(row.transaction.effective_income());
            group.expense = group.expense.saturating_add(row.transaction.effective_expense());
            group.rows.push(row.clone());
        }
        groups
    }
}

fn group_key(row: &CalculatedTransaction, by: GroupBy) -> String {
    match by {
        GroupBy::Month => row
            .calendar_date()
            .map(month_year_label)
            .unwrap_or_else(|| UNDATED_GROUP.to_string()),
        GroupBy::Category => row.category().to_string(),
    }
}

/// Case-insensitive substring match over text fields, raw amounts and their
/// currency rendering; `query` must already be trimmed and lowercased.
fn matches_search(txn: &Transaction, query: &str, money: &MoneyFormat) -> bool {
    let text_hit = [&txn.description, &txn.category, &txn.date]
        .iter()
        .any(|field| field.to_lowercase().contains(query));
    if text_hit {
        return true;
    }
    [txn.plan_income, txn.plan_expense, txn.act_income, txn.act_expense]
        .iter()
        .any(|amount| {
            amount.to_string().contains(query)
                || money.format(*amount).to_lowercase().contains(query)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::BalanceService;
    use chrono::NaiveDate;

    fn ledger() -> Vec<CalculatedTransaction> {
        let records = [
            Transaction::new("05/01/2026", "Gaji Januari", "Pemasukan").with_plan(50_000, 0),
            Transaction::new("10/01/2026", "Bioskop", "Hiburan").with_plan(0, 75_000),
            Transaction::new("02/02/2026", "Listrik", "Tagihan")
                .with_plan(0, 300_000)
                .with_actual(0, 320_000),
            Transaction::new("14/02/2026", "Konser", "Hiburan").with_actual(0, 150_000),
        ];
        BalanceService::calculate(&records, 2026)
    }

    fn filter(rows: &[CalculatedTransaction], query: TransactionFilter) -> Vec<CalculatedTransaction> {
        FilterService::filter(rows, &query, &MoneyFormat::default())
    }

    fn descriptions(rows: &[CalculatedTransaction]) -> Vec<&str> {
        rows.iter().map(|row| row.transaction.description.as_str()).collect()
    }

    #[test]
    fn search_matches_formatted_amounts() {
        let rows = ledger();
        let hits = filter(&rows, TransactionFilter::default().search("50.000"));
        assert_eq!(descriptions(&hits), ["Gaji Januari", "Konser"]);
    }

    #[test]
    fn search_is_case_insensitive_across_text_fields() {
        let rows = ledger();
        let by_category =
            filter(&rows, TransactionFilter::default().search("  hIBuran "));
        assert_eq!(descriptions(&by_category), ["Bioskop", "Konser"]);
        let by_date = filter(&rows, TransactionFilter::default().search("/02/"));
        assert_eq!(descriptions(&by_date), ["Listrik", "Konser"]);
        let raw_amount = filter(&rows, TransactionFilter::default().search("320000"));
        assert_eq!(descriptions(&raw_amount), ["Listrik"]);
    }

    #[test]
    fn category_filter_is_exact_unless_all() {
        let rows = ledger();
        let all = filter(&rows, TransactionFilter::default());
        assert_eq!(all.len(), 4);
        let bills = filter(&rows, TransactionFilter::default().category("Tagihan"));
        assert_eq!(descriptions(&bills), ["Listrik"]);
        let wrong_case =
            filter(&rows, TransactionFilter::default().category("tagihan"));
        assert!(wrong_case.is_empty());
    }

    #[test]
    fn date_range_bounds_are_inclusive_whole_days() {
        let rows = ledger();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 10),
            NaiveDate::from_ymd_opt(2026, 2, 2),
        );
        let hits = filter(&rows, TransactionFilter::default().date_range(range));
        assert_eq!(descriptions(&hits), ["Bioskop", "Listrik"]);

        let open_start = DateRange::new(None, NaiveDate::from_ymd_opt(2026, 1, 5));
        let hits = filter(&rows, TransactionFilter::default().date_range(open_start));
        assert_eq!(descriptions(&hits), ["Gaji Januari"]);
    }

    #[test]
    fn filtered_rows_keep_full_ledger_balances() {
        let rows = ledger();
        let hits = filter(&rows, TransactionFilter::default().category("Tagihan"));
        assert_eq!(hits[0].est_balance, rows[2].est_balance);
    }

    #[test]
    fn grouping_by_month_keeps_first_seen_order_and_effective_sums() {
        let rows = ledger();
        let groups = FilterService::group(&rows, GroupBy::Month);
        let keys: Vec<_> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(keys, ["Januari 2026", "Februari 2026"]);
        assert_eq!(groups[0].income, 50_000);
        assert_eq!(groups[0].expense, 75_000);
        assert_eq!(groups[1].expense, 470_000);
        assert_eq!(groups[1].rows.len(), 2);
    }

    #[test]
    fn grouping_by_category() {
        let rows = ledger();
        let groups = FilterService::group(&rows, GroupBy::Category);
        let keys: Vec<_> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(keys, ["Pemasukan", "Hiburan", "Tagihan"]);
        assert_eq!(groups[1].expense, 225_000);
    }

    #[test]
    fn undated_rows_get_their_own_group() {
        let rows = BalanceService::calculate(&[Transaction::new("", "?", "Lainnya")], 2026);
        let groups = FilterService::group(&rows, GroupBy::Month);
        assert_eq!(groups[0].key, UNDATED_GROUP);
    }

    #[test]
    fn search_uses_the_configured_money_format() {
        let rows = ledger();
        let dollars = MoneyFormat::new("en-US", "USD");
        let query = TransactionFilter::default().search("$75,000");
        let hits = FilterService::filter(&rows, &query, &dollars);
        assert_eq!(descriptions(&hits), ["Bioskop"]);
        assert!(filter(&rows, query).is_empty());
    }
}
