use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ledger::budget::{BudgetBook, CategoryBudget};
use crate::ledger::category::CategoryCatalog;
use crate::ledger::dates::{month_year_label, MONTH_NAMES};
use crate::ledger::CalculatedTransaction;

use super::{saturating_sum, ServiceError, ServiceResult};

/// Share of the limit at which a budget starts warning.
pub const WARNING_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    /// No limit set; never flagged.
    Unset,
    Safe,
    Warning,
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub category: String,
    pub limit: i64,
    pub spent: i64,
    /// `None` while the limit is unset.
    pub percent: Option<f64>,
    pub health: BudgetHealth,
}

impl BudgetStatus {
    pub fn is_over(&self) -> bool {
        self.health == BudgetHealth::Over
    }

    /// Amount left before the limit, negative once over.
    pub fn remaining(&self) -> i64 {
        self.limit.saturating_sub(self.spent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub total_budget: i64,
    pub total_spent: i64,
    pub over_count: usize,
    pub safe_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMonthReport {
    pub month_year: String,
    pub statuses: Vec<BudgetStatus>,
    pub overview: BudgetOverview,
}

pub struct BudgetService;

impl BudgetService {
    pub fn set_limit(
        book: &mut BudgetBook,
        category: &str,
        month_year: &str,
        limit: i64,
    ) -> ServiceResult<()> {
        if category.trim().is_empty() {
            return Err(ServiceError::Invalid("budget category is required".into()));
        }
        if limit < 0 {
            return Err(ServiceError::Invalid(format!(
                "budget limit for `{}` cannot be negative",
                category.trim()
            )));
        }
        book.set_limit(category, month_year, limit);
        Ok(())
    }

    /// Effective expense per category for rows dated inside `month_year`, keyed by
    /// the trimmed, lowercased category name.
    pub fn spending_for_month(
        rows: &[CalculatedTransaction],
        month_year: &str,
    ) -> HashMap<String, i64> {
        let mut spending = HashMap::new();
        for row in rows {
            let in_month = row
                .calendar_date()
                .is_some_and(|date| month_year_label(date) == month_year);
            let amount = row.transaction.effective_expense();
            if in_month && amount > 0 {
                let total: &mut i64 = spending.entry(spending_key(row.category())).or_insert(0);
                *total = total.saturating_add(amount);
            }
        }
        spending
    }

    pub fn status(budget: &CategoryBudget, spending: &HashMap<String, i64>) -> BudgetStatus {
        let spent = spending
            .get(&spending_key(&budget.category))
            .copied()
            .unwrap_or(0);
        let limit = budget.limit;
        let percent = (limit > 0).then(|| spent as f64 / limit as f64 * 100.0);
        let health = match percent {
            None => BudgetHealth::Unset,
            Some(_) if spent > limit => BudgetHealth::Over,
            Some(pct) if pct >= WARNING_PERCENT => BudgetHealth::Warning,
            Some(_) => BudgetHealth::Safe,
        };
        BudgetStatus {
            category: budget.category.clone(),
            limit,
            spent,
            percent,
            health,
        }
    }

    /// Every non-income category's limit and spend for one month, plus the roll-up.
    pub fn month_report(
        book: &BudgetBook,
        catalog: &CategoryCatalog,
        rows: &[CalculatedTransaction],
        month_year: &str,
    ) -> BudgetMonthReport {
        let spending = Self::spending_for_month(rows, month_year);
        let statuses: Vec<BudgetStatus> = book
            .budgets_for_month(month_year, catalog)
            .iter()
            .map(|budget| Self::status(budget, &spending))
            .collect();
        let overview = BudgetOverview {
            total_budget: saturating_sum(statuses.iter().map(|status| status.limit)),
            total_spent: saturating_sum(statuses.iter().map(|status| status.spent)),
            over_count: statuses.iter().filter(|status| status.is_over()).count(),
            safe_count: statuses
                .iter()
                .filter(|status| status.health == BudgetHealth::Safe)
                .count(),
        };
        BudgetMonthReport {
            month_year: month_year.to_string(),
            statuses,
            overview,
        }
    }

    /// Moves a month label by `offset` months, e.g. `Januari 2026` by -1 gives
    /// `Desember 2025`. `None` when the label is not a month label.
    pub fn shift_month(month_year: &str, offset: i32) -> Option<String> {
        let (name, year) = month_year.trim().rsplit_once(' ')?;
        let year: i32 = year.parse().ok()?;
        let month0 = MONTH_NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name.trim()))?;
        let absolute = year * 12 + month0 as i32 + offset;
        let date = NaiveDate::from_ymd_opt(absolute.div_euclid(12), absolute.rem_euclid(12) as u32 + 1, 1)?;
        Some(month_year_label(date))
    }

    /// Budget partition key for the month containing `date`.
    pub fn month_of(date: NaiveDate) -> String {
        month_year_label(date)
    }
}

fn spending_key(category: &str) -> String {
    category.trim().to_lowercase()
}
