use std::io::{Read, Write};

use serde::Serialize;

use crate::errors::LedgerError;
use crate::ledger::{CalculatedTransaction, Transaction};

use super::{transaction_from_row, SheetRow};

/// Shown in the difference column of rows without any recorded actuals.
pub const NO_DATA: &str = "No Data";

pub const EXPORT_HEADERS: [&str; 11] = [
    "ID",
    "Tanggal",
    "Keterangan",
    "Kategori",
    "Rencana Masuk",
    "Rencana Keluar",
    "Estimasi Saldo",
    "Aktual Masuk",
    "Aktual Keluar",
    "Saldo Aktual",
    "Selisih",
];

/// One exported line, column order as in [`EXPORT_HEADERS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub id: u32,
    pub date: String,
    pub description: String,
    pub category: String,
    pub plan_income: i64,
    pub plan_expense: i64,
    pub est_balance: i64,
    pub act_income: i64,
    pub act_expense: i64,
    pub act_balance: i64,
    pub difference: String,
}

impl From<&CalculatedTransaction> for ExportRow {
    fn from(row: &CalculatedTransaction) -> Self {
        let txn = &row.transaction;
        let difference = if txn.has_actuals() {
            row.difference.to_string()
        } else {
            NO_DATA.to_string()
        };
        Self {
            id: txn.id,
            date: txn.date.clone(),
            description: txn.description.clone(),
            category: txn.category.clone(),
            plan_income: txn.plan_income,
            plan_expense: txn.plan_expense,
            est_balance: row.est_balance,
            act_income: txn.act_income,
            act_expense: txn.act_expense,
            act_balance: row.act_balance,
            difference,
        }
    }
}

pub fn export_rows(rows: &[CalculatedTransaction]) -> Vec<ExportRow> {
    rows.iter().map(ExportRow::from).collect()
}

/// Writes `rows` as CSV with the Indonesian header line, even when empty.
pub fn export_csv<W: Write>(writer: W, rows: &[CalculatedTransaction]) -> Result<(), LedgerError> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(EXPORT_HEADERS)?;
    for row in export_rows(rows) {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Reads a CSV sheet whose first line holds the headers. Blank lines are skipped;
/// a sheet without data rows is rejected.
pub fn import_csv<R: Read>(reader: R) -> Result<Vec<Transaction>, LedgerError> {
    let mut input = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = input.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for result in input.records() {
        let record = result?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let row: SheetRow = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        records.push(transaction_from_row(&row));
    }

    if records.is_empty() {
        return Err(LedgerError::InvalidInput(
            "sheet is empty or its format is not recognized".into(),
        ));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::BalanceService;

    #[test]
    fn import_reads_synonym_headers() {
        let data = "\
No,Date,Keterangan,category,income_plan,Plan Expense,Aktual Masuk,Actual Expense
1,05/01/2026,Gaji,Pemasukan,5000000,0,4800000,0

2,06/01/2026,Listrik,,0,300000,,abc
";
        let rows = import_csv(data.as_bytes()).expect("import");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].plan_income, 5_000_000);
        assert_eq!(rows[0].act_income, 4_800_000);
        assert_eq!(rows[1].category, "Lainnya");
        assert_eq!(rows[1].plan_expense, 300_000);
        assert_eq!(rows[1].act_expense, 0);
    }

    #[test]
    fn empty_sheet_is_rejected() {
        let err = import_csv("Tanggal,Keterangan\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn export_marks_rows_without_actuals() {
        let records = [
            Transaction::new("01/01/2026", "Gaji", "Pemasukan").with_plan(1000, 0),
            Transaction::new("02/01/2026", "Listrik", "Tagihan")
                .with_plan(0, 200)
                .with_actual(0, 300),
        ];
        let calculated = BalanceService::calculate(&records, 2026);
        let rows = export_rows(&calculated);
        assert_eq!(rows[0].difference, NO_DATA);
        assert_eq!(rows[1].difference, "-100");

        let mut out = Vec::new();
        export_csv(&mut out, &calculated).expect("export");
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(EXPORT_HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("0,01/01/2026,Gaji,Pemasukan,1000,0,1000,0,0,1000,No Data")
        );
    }

    #[test]
    fn exported_sheet_imports_back() {
        let records = [Transaction::new("03/01/2026", "Pasar", "Kebutuhan Pokok")
            .with_plan(0, 150)
            .with_actual(0, 140)];
        let calculated = BalanceService::calculate(&records, 2026);
        let mut out = Vec::new();
        export_csv(&mut out, &calculated).unwrap();
        let back = import_csv(out.as_slice()).unwrap();
        assert_eq!(back[0].description, "Pasar");
        assert_eq!(back[0].act_expense, 140);
    }
}
