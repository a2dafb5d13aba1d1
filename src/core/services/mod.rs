pub mod analytics_service;
pub mod balance_service;
pub mod budget_service;
pub mod filter_service;
pub mod summary_service;

pub use analytics_service::AnalyticsService;
pub use balance_service::BalanceService;
pub use budget_service::BudgetService;
pub use filter_service::FilterService;
pub use summary_service::SummaryService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}

/// Adds amounts without overflowing; the result sticks at the `i64` bounds.
pub(crate) fn saturating_sum<I: IntoIterator<Item = i64>>(values: I) -> i64 {
    values.into_iter().fold(0, i64::saturating_add)
}
