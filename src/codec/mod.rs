//! File formats the ledger is moved in and out with.
//!
//! Spreadsheet rows are read by header name rather than position, and each field
//! accepts the English, Indonesian and snake_case spellings produced by earlier
//! exports and hand-made sheets.

pub mod json;
pub mod spreadsheet;

pub use json::{export_json, import_json, load_from_file, save_to_file};
pub use spreadsheet::{export_csv, export_rows, import_csv, ExportRow, EXPORT_HEADERS, NO_DATA};

use crate::ledger::category::DEFAULT_CATEGORY;
use crate::ledger::Transaction;

pub const ID_HEADERS: &[&str] = &["ID", "No"];
pub const DATE_HEADERS: &[&str] = &["Tanggal", "Date", "date"];
pub const DESCRIPTION_HEADERS: &[&str] = &["Keterangan", "Description", "description"];
pub const CATEGORY_HEADERS: &[&str] = &["Kategori", "Category", "category"];
pub const PLAN_INCOME_HEADERS: &[&str] = &["Rencana Masuk", "Plan Income", "income_plan"];
pub const PLAN_EXPENSE_HEADERS: &[&str] = &["Rencana Keluar", "Plan Expense", "expense_plan"];
pub const ACT_INCOME_HEADERS: &[&str] = &["Aktual Masuk", "Actual Income", "income_actual"];
pub const ACT_EXPENSE_HEADERS: &[&str] = &["Aktual Keluar", "Actual Expense", "expense_actual"];

/// One imported row as (header, cell) pairs in column order.
pub type SheetRow = Vec<(String, String)>;

/// Cell under the first header matching any of `synonyms`, compared trimmed and
/// case-insensitively.
pub fn cell<'a>(row: &'a [(String, String)], synonyms: &[&str]) -> Option<&'a str> {
    row.iter()
        .find(|(header, _)| {
            let header = header.trim().to_lowercase();
            synonyms
                .iter()
                .any(|candidate| candidate.trim().to_lowercase() == header)
        })
        .map(|(_, value)| value.as_str())
}

/// Reads a numeric cell; anything unreadable counts as zero and negatives clamp to zero.
pub fn parse_amount(raw: Option<&str>) -> i64 {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return 0;
    };
    let value = match text.parse::<i64>() {
        Ok(value) => value,
        Err(_) => match text.parse::<f64>() {
            // `as` saturates at the i64 bounds.
            Ok(value) if value.is_finite() => value.round() as i64,
            _ => 0,
        },
    };
    value.max(0)
}

/// Builds a transaction from a sheet row; missing text stays empty, a missing
/// category falls back to the catch-all.
pub fn transaction_from_row(row: &[(String, String)]) -> Transaction {
    let text = |synonyms: &[&str]| cell(row, synonyms).unwrap_or_default().to_string();
    let category = cell(row, CATEGORY_HEADERS)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);
    let mut txn = Transaction::new(text(DATE_HEADERS), text(DESCRIPTION_HEADERS), category)
        .with_plan(
            parse_amount(cell(row, PLAN_INCOME_HEADERS)),
            parse_amount(cell(row, PLAN_EXPENSE_HEADERS)),
        )
        .with_actual(
            parse_amount(cell(row, ACT_INCOME_HEADERS)),
            parse_amount(cell(row, ACT_EXPENSE_HEADERS)),
        );
    txn.id = u32::try_from(parse_amount(cell(row, ID_HEADERS))).unwrap_or(0);
    txn
}
