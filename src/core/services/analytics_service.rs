//! Read-only aggregations behind the analytics screen.
//!
//! Three row sets feed the report. The filtered rows inside the date range drive
//! the category breakdown, savings metrics, suggestions and balance history. The
//! full ledger inside the date range drives the monthly trend and weekly insight.
//! The full ledger without any range drives the month donut, the month comparison
//! and the heatmap, which are always anchored on the real calendar.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::time::Clock;
use crate::ledger::category::{DEBT_CATEGORY, DEFAULT_CATEGORY, ENTERTAINMENT_CATEGORY};
use crate::ledger::dates::{
    day_end_millis, day_start_millis, month_end, month_year_label, previous_month_start,
    short_month_label, DateRange,
};
use crate::ledger::CalculatedTransaction;

use super::saturating_sum;

const LABEL_LIMIT: usize = 10;
const WEEKLY_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub date: String,
    pub act_balance: i64,
    pub est_balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub text: &'static str,
}

impl Suggestion {
    fn new(kind: SuggestionKind, text: &'static str) -> Self {
        Self { kind, text }
    }
}

pub const INSUFFICIENT_DATA: &str = "Belum ada data transaksi yang cukup untuk dianalisis.";
pub const DEFICIT: &str = "DEFISIT: Pengeluaran lebih besar dari pemasukan. Kurangi belanja gaya hidup dan dahulukan kebutuhan pokok.";
pub const SURPLUS: &str = "SURPLUS: Arus kas positif. Pindahkan kelebihannya ke dana darurat atau investasi.";
pub const LOW_SAVINGS: &str = "RISIKO: Tingkat tabungan di bawah 10%. Usahakan menyisihkan minimal 20% pendapatan (50/30/20).";
pub const HEALTHY_SAVINGS: &str = "SEHAT: Tabungan di atas 20% pendapatan. Pertahankan.";
pub const HIGH_SAVINGS: &str = "SANGAT SEHAT: Tabungan di atas 50% pendapatan. Kemandirian finansial makin dekat.";
pub const DEBT_RISK: &str = "BAHAYA UTANG: Cicilan melebihi 30% pendapatan. Tahan utang baru dan lunasi yang bunganya tertinggi.";
pub const LIFESTYLE_RISK: &str = "GAYA HIDUP TINGGI: Hiburan dan Lainnya melebihi 30% pengeluaran. Coba satu minggu tanpa belanja.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    /// `YYYY-MM`, sorts chronologically.
    pub key: String,
    pub label: String,
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthComparison {
    pub category: String,
    /// Display label, cut to ten characters.
    pub label: String,
    pub this_month: i64,
    pub last_month: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCategoryDelta {
    pub category: String,
    pub this_week: i64,
    pub last_week: i64,
    pub diff: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyInsight {
    pub total_this_week: i64,
    pub total_last_week: i64,
    pub diff: i64,
    pub by_category: Vec<WeeklyCategoryDelta>,
}

/// Expense per calendar day keyed by ISO date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Heatmap(pub BTreeMap<String, i64>);

impl Heatmap {
    pub fn get(&self, day: NaiveDate) -> i64 {
        self.0.get(&iso_key(day)).copied().unwrap_or(0)
    }

    /// Every day of the trailing `weeks` ending on `today`, zero-filled.
    pub fn trailing(&self, today: NaiveDate, weeks: u32) -> Vec<(NaiveDate, i64)> {
        let days = i64::from(weeks) * 7;
        (0..days)
            .rev()
            .map(|back| today - Duration::days(back))
            .map(|day| (day, self.get(day)))
            .collect()
    }

    pub fn max(&self) -> i64 {
        self.0.values().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub category_totals: Vec<CategoryAmount>,
    pub balance_history: Vec<BalancePoint>,
    pub total_income: i64,
    pub total_expense: i64,
    pub net_savings: i64,
    pub savings_rate: f64,
    pub suggestions: Vec<Suggestion>,
    pub last_act_balance: i64,
    pub current_month_balance: i64,
    pub current_month_est: i64,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub donut: Vec<CategoryAmount>,
    pub month_comparison: Vec<MonthComparison>,
    pub weekly: WeeklyInsight,
    pub heatmap: Heatmap,
    pub this_month_label: String,
    pub prev_month_label: String,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// Builds the report. `all` may be empty, in which case `filtered` stands in for it.
    pub fn compute(
        filtered: &[CalculatedTransaction],
        all: &[CalculatedTransaction],
        range: &DateRange,
        clock: &dyn Clock,
    ) -> AnalyticsReport {
        let today = clock.today();
        let full = if all.is_empty() { filtered } else { all };
        let base = in_range(filtered, range);
        let source = in_range(full, range);

        let mut expense_by_category = Tally::default();
        let mut total_income = 0_i64;
        let mut total_expense = 0_i64;
        for row in &base {
            let expense = row.transaction.effective_expense();
            let income = row.transaction.effective_income();
            if expense > 0 {
                expense_by_category.add(row.category(), expense);
                total_expense = total_expense.saturating_add(expense);
            }
            if income > 0 {
                total_income = total_income.saturating_add(income);
            }
        }
        let net_savings = total_income.saturating_sub(total_expense);
        let savings_rate = if total_income > 0 {
            net_savings as f64 / total_income as f64 * 100.0
        } else {
            0.0
        };
        let suggestions = suggest(
            total_income,
            total_expense,
            savings_rate,
            &expense_by_category,
        );

        let month_cutoff = day_end_millis(month_end(today));
        let up_to_month_end = base.iter().rev().find(|row| row.timestamp() <= month_cutoff);

        let prev_month = previous_month_start(today);
        let (donut, month_comparison) = month_breakdown(full, today, prev_month);

        AnalyticsReport {
            category_totals: expense_by_category.into_sorted(),
            balance_history: base
                .iter()
                .map(|row| BalancePoint {
                    date: row.date().to_string(),
                    act_balance: row.act_balance,
                    est_balance: row.est_balance,
                })
                .collect(),
            total_income,
            total_expense,
            net_savings,
            savings_rate,
            suggestions,
            last_act_balance: base.last().map_or(0, |row| row.act_balance),
            current_month_balance: up_to_month_end.map_or(0, |row| row.act_balance),
            current_month_est: up_to_month_end.map_or(0, |row| row.est_balance),
            monthly_trend: monthly_trend(&source),
            donut,
            month_comparison,
            weekly: weekly_insight(&source, today),
            heatmap: heatmap(full),
            this_month_label: month_year_label(today),
            prev_month_label: month_year_label(prev_month),
        }
    }
}

fn in_range<'a>(rows: &'a [CalculatedTransaction], range: &DateRange) -> Vec<&'a CalculatedTransaction> {
    rows.iter()
        .filter(|row| range.contains(row.timestamp()))
        .collect()
}

fn suggest(income: i64, expense: i64, savings_rate: f64, by_category: &Tally) -> Vec<Suggestion> {
    use SuggestionKind::*;

    if income == 0 && expense == 0 {
        return vec![Suggestion::new(Info, INSUFFICIENT_DATA)];
    }
    let mut out = Vec::new();
    if income < expense {
        out.push(Suggestion::new(Warning, DEFICIT));
    } else {
        out.push(Suggestion::new(Success, SURPLUS));
    }
    if savings_rate > 0.0 && savings_rate < 10.0 {
        out.push(Suggestion::new(Warning, LOW_SAVINGS));
    } else if (20.0..50.0).contains(&savings_rate) {
        out.push(Suggestion::new(Success, HEALTHY_SAVINGS));
    } else if savings_rate >= 50.0 {
        out.push(Suggestion::new(Success, HIGH_SAVINGS));
    }
    if income > 0 && ratio(by_category.get(DEBT_CATEGORY), income) > 0.3 {
        out.push(Suggestion::new(Warning, DEBT_RISK));
    }
    let lifestyle = by_category
        .get(ENTERTAINMENT_CATEGORY)
        .saturating_add(by_category.get(DEFAULT_CATEGORY));
    if expense > 0 && ratio(lifestyle, expense) > 0.3 {
        out.push(Suggestion::new(Warning, LIFESTYLE_RISK));
    }
    out
}

fn ratio(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn monthly_trend(rows: &[&CalculatedTransaction]) -> Vec<MonthlyTrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), (NaiveDate, i64, i64)> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.calendar_date() else {
            continue;
        };
        let bucket = buckets
            .entry((date.year(), date.month()))
            .or_insert((date, 0, 0));
        bucket.1 = bucket.1.saturating_add(row.transaction.effective_income());
        bucket.2 = bucket.2.saturating_add(row.transaction.effective_expense());
    }
    buckets
        .into_iter()
        .map(|((year, month), (date, income, expense))| MonthlyTrendPoint {
            key: format!("{year}-{month:02}"),
            label: short_month_label(date),
            income,
            expense,
            net: income.saturating_sub(expense),
        })
        .collect()
}

fn month_breakdown(
    rows: &[CalculatedTransaction],
    today: NaiveDate,
    prev_month: NaiveDate,
) -> (Vec<CategoryAmount>, Vec<MonthComparison>) {
    let same_month =
        |a: NaiveDate, b: NaiveDate| a.year() == b.year() && a.month() == b.month();
    let mut this_month = Tally::default();
    let mut last_month = Tally::default();
    for row in rows {
        let expense = row.transaction.effective_expense();
        if expense <= 0 {
            continue;
        }
        let Some(date) = row.calendar_date() else {
            continue;
        };
        if same_month(date, today) {
            this_month.add(row.category(), expense);
        } else if same_month(date, prev_month) {
            last_month.add(row.category(), expense);
        }
    }

    let mut categories: Vec<String> = this_month.keys().to_vec();
    for name in last_month.keys() {
        if !categories.contains(name) {
            categories.push(name.clone());
        }
    }
    let mut comparison: Vec<MonthComparison> = categories
        .into_iter()
        .map(|category| MonthComparison {
            label: comparison_label(&category),
            this_month: this_month.get(&category),
            last_month: last_month.get(&category),
            category,
        })
        .collect();
    comparison
        .sort_by_key(|entry| std::cmp::Reverse(entry.this_month.saturating_add(entry.last_month)));

    (this_month.into_sorted(), comparison)
}

fn comparison_label(category: &str) -> String {
    if category.is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }
    if category.chars().count() > LABEL_LIMIT {
        let mut label: String = category.chars().take(LABEL_LIMIT).collect();
        label.push('…');
        label
    } else {
        category.to_string()
    }
}

/// Recorded expense only: planned spending has not happened yet.
fn weekly_insight(rows: &[&CalculatedTransaction], today: NaiveDate) -> WeeklyInsight {
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let this_week_from = day_start_millis(week_start);
    let this_week_to = day_end_millis(today);
    let last_week_from = day_start_millis(week_start - Duration::days(7));

    let mut this_week = Tally::default();
    let mut last_week = Tally::default();
    for row in rows {
        let expense = row.transaction.act_expense;
        if expense <= 0 {
            continue;
        }
        let ts = row.timestamp();
        if (this_week_from..=this_week_to).contains(&ts) {
            this_week.add(row.category(), expense);
        } else if (last_week_from..this_week_from).contains(&ts) {
            last_week.add(row.category(), expense);
        }
    }

    let total_this_week = this_week.total();
    let total_last_week = last_week.total();
    let mut categories: Vec<String> = this_week.keys().to_vec();
    for name in last_week.keys() {
        if !categories.contains(name) {
            categories.push(name.clone());
        }
    }
    let mut by_category: Vec<WeeklyCategoryDelta> = categories
        .into_iter()
        .map(|category| {
            let this = this_week.get(&category);
            let last = last_week.get(&category);
            WeeklyCategoryDelta {
                category,
                this_week: this,
                last_week: last,
                diff: this.saturating_sub(last),
            }
        })
        .collect();
    by_category.sort_by_key(|entry| std::cmp::Reverse(entry.diff.unsigned_abs()));
    by_category.truncate(WEEKLY_TOP);

    WeeklyInsight {
        total_this_week,
        total_last_week,
        diff: total_this_week.saturating_sub(total_last_week),
        by_category,
    }
}

fn heatmap(rows: &[CalculatedTransaction]) -> Heatmap {
    let mut days = BTreeMap::new();
    for row in rows {
        let expense = row.transaction.effective_expense();
        if expense <= 0 {
            continue;
        }
        if let Some(date) = row.calendar_date() {
            let day: &mut i64 = days.entry(iso_key(date)).or_insert(0);
            *day = day.saturating_add(expense);
        }
    }
    Heatmap(days)
}

fn iso_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Per-category sums that remember the order categories were first seen, so ties
/// in later sorts come out the same on every run.
#[derive(Debug, Default)]
struct Tally {
    names: Vec<String>,
    sums: HashMap<String, i64>,
}

impl Tally {
    fn add(&mut self, name: &str, amount: i64) {
        match self.sums.get_mut(name) {
            Some(sum) => *sum = sum.saturating_add(amount),
            None => {
                self.names.push(name.to_string());
                self.sums.insert(name.to_string(), amount);
            }
        }
    }

    fn get(&self, name: &str) -> i64 {
        self.sums.get(name).copied().unwrap_or(0)
    }

    fn keys(&self) -> &[String] {
        &self.names
    }

    fn total(&self) -> i64 {
        saturating_sum(self.sums.values().copied())
    }

    /// Descending by value; equal values keep first-seen order.
    fn into_sorted(mut self) -> Vec<CategoryAmount> {
        let mut out: Vec<CategoryAmount> = self
            .names
            .drain(..)
            .map(|name| CategoryAmount {
                value: self.sums.get(&name).copied().unwrap_or(0),
                name,
            })
            .collect();
        out.sort_by_key(|entry| std::cmp::Reverse(entry.value));
        out
    }
}
