use serde::{Deserialize, Serialize};

use super::category::{CategoryCatalog, INCOME_CATEGORY};

/// A spending guardrail for one category in one month.
///
/// `month_year` is the display label of the month (`Januari 2026`) and acts purely
/// as a partition key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub category: String,
    pub limit: i64,
    pub month_year: String,
}

impl CategoryBudget {
    pub fn new(category: impl Into<String>, limit: i64, month_year: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            limit,
            month_year: month_year.into(),
        }
    }

    /// A limit of zero means no budget was set.
    pub fn is_set(&self) -> bool {
        self.limit > 0
    }
}

/// Every stored (category, month) limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetBook {
    entries: Vec<CategoryBudget>,
}

impl BudgetBook {
    pub fn new(entries: Vec<CategoryBudget>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CategoryBudget] {
        &self.entries
    }

    /// One entry per non-income category in catalog order, limit 0 where nothing is stored.
    pub fn budgets_for_month(
        &self,
        month_year: &str,
        catalog: &CategoryCatalog,
    ) -> Vec<CategoryBudget> {
        catalog
            .names()
            .into_iter()
            .filter(|name| name != INCOME_CATEGORY)
            .map(|name| {
                let limit = self
                    .find(&name, month_year)
                    .map_or(0, |stored| stored.limit);
                CategoryBudget::new(name, limit, month_year)
            })
            .collect()
    }

    /// Inserts or overwrites the limit stored under (trimmed category, month).
    pub fn set_limit(&mut self, category: &str, month_year: &str, limit: i64) {
        let category = category.trim();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.category.trim() == category && entry.month_year == month_year)
        {
            Some(entry) => entry.limit = limit,
            None => self
                .entries
                .push(CategoryBudget::new(category, limit, month_year)),
        }
    }

    /// Drops every limit stored for `month_year`; other months are untouched.
    pub fn reset_month(&mut self, month_year: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.month_year != month_year);
        self.entries.len() != before
    }

    fn find(&self, category: &str, month_year: &str) -> Option<&CategoryBudget> {
        let category = category.trim();
        self.entries
            .iter()
            .find(|entry| entry.category.trim() == category && entry.month_year == month_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_view_is_complete_and_ordered() {
        let mut book = BudgetBook::default();
        book.set_limit("Tagihan", "Januari 2026", 500_000);
        let catalog = CategoryCatalog::default();

        let budgets = book.budgets_for_month("Januari 2026", &catalog);
        let names: Vec<_> = budgets.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(
            names,
            ["Kebutuhan Pokok", "Tagihan", "Hiburan", "Tabungan", "Cicilan", "Lainnya"]
        );
        assert_eq!(budgets[1].limit, 500_000);
        assert!(budgets.iter().filter(|b| b.category != "Tagihan").all(|b| b.limit == 0));
        assert!(budgets.iter().all(|b| b.month_year == "Januari 2026"));
    }

    #[test]
    fn set_limit_upserts_on_trimmed_key() {
        let mut book = BudgetBook::default();
        book.set_limit(" Hiburan ", "Maret 2026", 100);
        book.set_limit("Hiburan", "Maret 2026", 250);
        book.set_limit("Hiburan", "April 2026", 80);
        assert_eq!(book.entries().len(), 2);
        assert_eq!(book.entries()[0], CategoryBudget::new("Hiburan", 250, "Maret 2026"));
    }

    #[test]
    fn reset_month_only_touches_that_month() {
        let mut book = BudgetBook::default();
        book.set_limit("Hiburan", "Maret 2026", 100);
        book.set_limit("Tagihan", "Maret 2026", 200);
        book.set_limit("Hiburan", "April 2026", 80);
        assert!(book.reset_month("Maret 2026"));
        assert_eq!(book.entries(), [CategoryBudget::new("Hiburan", 80, "April 2026")]);
        assert!(!book.reset_month("Mei 2026"));
    }
}
