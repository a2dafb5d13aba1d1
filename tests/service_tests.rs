use cashflow_core::{
    core::services::{
        analytics_service::{SuggestionKind, DEBT_RISK, LIFESTYLE_RISK},
        filter_service::{GroupBy, TransactionFilter},
        AnalyticsService, BalanceService, BudgetService, FilterService,
    },
    core::time::FixedClock,
    currency::MoneyFormat,
    ledger::{BudgetBook, CalculatedTransaction, CategoryCatalog, DateRange, Ledger, Transaction},
};
use chrono::NaiveDate;

const YEAR: i32 = 2026;

fn prepared_rows() -> Vec<Transaction> {
    let records = vec![
        Transaction::new("01/03/2026", "Gaji", "Pemasukan").with_plan(4_000_000, 0),
        Transaction::new("03/03/2026", "Motor", "Cicilan").with_plan(0, 1_500_000),
        Transaction::new("06/03/2026", "Konser", "Hiburan").with_actual(0, 1_000_000),
        Transaction::new("08/03/2026", "Pasar", "Kebutuhan Pokok").with_plan(0, 600_000),
        Transaction::new("02/04/2026", "Listrik", "Tagihan").with_plan(0, 300_000),
    ];
    Ledger::from_transactions(records, YEAR).into_transactions()
}

fn calculated_rows() -> Vec<CalculatedTransaction> {
    BalanceService::calculate(&prepared_rows(), YEAR)
}

#[test]
fn services_compose_over_one_ledger() {
    let calculated = calculated_rows();
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());

    let march_range = DateRange::from_inputs("2026-03-01", "2026-03-31", &clock);
    let march = FilterService::filter(
        &calculated,
        &TransactionFilter::default().date_range(march_range),
        &MoneyFormat::default(),
    );
    assert_eq!(march.len(), 4);

    let report = AnalyticsService::compute(&march, &calculated, &DateRange::default(), &clock);
    let texts: Vec<_> = report.suggestions.iter().map(|s| s.text).collect();
    assert!(texts.contains(&DEBT_RISK));
    assert!(texts.contains(&LIFESTYLE_RISK));
    assert!(report
        .suggestions
        .iter()
        .filter(|s| s.text == DEBT_RISK || s.text == LIFESTYLE_RISK)
        .all(|s| s.kind == SuggestionKind::Warning));
    assert_eq!(report.category_totals[0].name, "Cicilan");
}

#[test]
fn category_groups_sum_effective_amounts() {
    let calculated = calculated_rows();
    let groups = FilterService::group(&calculated, GroupBy::Category);
    let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, ["Pemasukan", "Cicilan", "Hiburan", "Kebutuhan Pokok", "Tagihan"]);
    assert_eq!(groups[2].expense, 1_000_000);
}

#[test]
fn budgets_follow_the_month_they_belong_to() {
    let rows = calculated_rows();
    let mut book = BudgetBook::default();
    BudgetService::set_limit(&mut book, "Tagihan", "April 2026", 250_000).unwrap();
    let catalog = CategoryCatalog::default();

    let april = BudgetService::month_report(&book, &catalog, &rows, "April 2026");
    assert_eq!(april.overview.over_count, 1);
    let march = BudgetService::month_report(&book, &catalog, &rows, "Maret 2026");
    assert_eq!(march.overview.total_budget, 0);

    let previous = BudgetService::shift_month("April 2026", -1).unwrap();
    assert_eq!(previous, "Maret 2026");
    assert!(book.reset_month("April 2026"));
    assert!(book.entries().is_empty());
}
