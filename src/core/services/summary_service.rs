use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::core::time::Clock;
use crate::ledger::dates::month_year_label;
use crate::ledger::CalculatedTransaction;

use super::saturating_sum;

/// Headline figures shown above the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub final_est_balance: i64,
    pub final_act_balance: i64,
    pub period_income: i64,
    pub period_expense: i64,
}

/// Planned against recorded figures for the real current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub act_income: i64,
    pub act_expense: i64,
    pub est_income: i64,
    pub est_expense: i64,
    pub month_label: String,
}

/// Rows picked for a report together with totals recomputed over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSelection {
    pub rows: Vec<CalculatedTransaction>,
    pub totals: LedgerTotals,
    pub title: String,
}

pub struct SummaryService;

impl SummaryService {
    /// Final balances come from the last row of the whole ledger; period sums use
    /// effective amounts of the visible rows.
    pub fn totals(calculated: &[CalculatedTransaction], visible: &[CalculatedTransaction]) -> LedgerTotals {
        let last = calculated.last();
        LedgerTotals {
            final_est_balance: last.map_or(0, |row| row.est_balance),
            final_act_balance: last.map_or(0, |row| row.act_balance),
            period_income: saturating_sum(visible.iter().map(|row| row.transaction.effective_income())),
            period_expense: saturating_sum(
                visible.iter().map(|row| row.transaction.effective_expense()),
            ),
        }
    }

    pub fn current_month_totals(calculated: &[CalculatedTransaction], clock: &dyn Clock) -> MonthlyTotals {
        let today = clock.today();
        let rows: Vec<_> = calculated
            .iter()
            .filter(|row| {
                row.calendar_date()
                    .is_some_and(|date| date.year() == today.year() && date.month() == today.month())
            })
            .map(|row| &row.transaction)
            .collect();
        MonthlyTotals {
            act_income: saturating_sum(rows.iter().map(|txn| txn.act_income)),
            act_expense: saturating_sum(rows.iter().map(|txn| txn.act_expense)),
            est_income: saturating_sum(rows.iter().map(|txn| txn.plan_income)),
            est_expense: saturating_sum(rows.iter().map(|txn| txn.plan_expense)),
            month_label: month_year_label(today),
        }
    }

    /// Rows dated on `day`, in ledger order.
    pub fn transactions_on(calculated: &[CalculatedTransaction], day: NaiveDate) -> Vec<CalculatedTransaction> {
        calculated
            .iter()
            .filter(|row| row.calendar_date() == Some(day))
            .cloned()
            .collect()
    }

    /// Distinct month labels present in the ledger, oldest first.
    pub fn available_months(calculated: &[CalculatedTransaction]) -> Vec<String> {
        let mut months: Vec<String> = Vec::new();
        for label in calculated.iter().filter_map(|row| row.calendar_date().map(month_year_label)) {
            if !months.contains(&label) {
                months.push(label);
            }
        }
        months
    }

    /// Rows falling in any of `months` (month labels), with balances taken from the
    /// last selected row.
    pub fn select_months(calculated: &[CalculatedTransaction], months: &[String]) -> ExportSelection {
        let rows: Vec<CalculatedTransaction> = calculated
            .iter()
            .filter(|row| {
                row.calendar_date()
                    .is_some_and(|date| months.contains(&month_year_label(date)))
            })
            .cloned()
            .collect();
        let totals = Self::totals(&rows, &rows);
        let title = match months {
            [single] => format!("Laporan Keuangan - {single}"),
            _ => "Ringkasan Laporan Keuangan Multibulan".to_string(),
        };
        ExportSelection { rows, totals, title }
    }
}
