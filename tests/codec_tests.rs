mod common;

use cashflow_core::{
    codec::{EXPORT_HEADERS, NO_DATA},
    core::services::filter_service::GroupBy,
    storage::StorageBackend,
};
use common::{memory_manager, row};

#[test]
fn csv_import_accepts_header_synonyms_and_resorts() {
    let (mut manager, storage) = memory_manager();
    let sheet = "\
No,Date,KETERANGAN,kategori,Plan Income,expense_plan,Aktual Masuk,Actual Expense
1,20/03/2026,Listrik,Tagihan,0,300000,,310000
2,01/03/2026,Gaji,Pemasukan,5000000,0,5000000,0
3,05/03/2026,Jajan,,0,15000.4,,
";
    let imported = manager.import_csv(sheet.as_bytes()).expect("import");
    assert_eq!(imported, 3);

    let rows = manager.transactions();
    let descriptions: Vec<_> = rows.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, ["Gaji", "Jajan", "Listrik"]);
    assert_eq!(rows[1].category, "Lainnya");
    assert_eq!(rows[1].plan_expense, 15_000);
    assert_eq!(rows[2].act_expense, 310_000);
    assert_eq!(rows[2].id, 3);
    assert_eq!(storage.load_transactions().unwrap().len(), 3);
    assert!(manager.can_undo(), "an import is undoable");
}

#[test]
fn empty_sheets_are_rejected_without_touching_the_ledger() {
    let (mut manager, _storage) = memory_manager();
    manager.add(row("01/03/2026", "keep", "Lainnya")).unwrap();
    assert!(manager.import_csv("Tanggal,Keterangan\n".as_bytes()).is_err());
    assert!(manager.import_json("{ nope".as_bytes()).is_err());
    assert_eq!(manager.transactions().len(), 1);
}

#[test]
fn csv_export_marks_rows_without_actuals() {
    let (mut manager, _storage) = memory_manager();
    manager
        .add(row("01/03/2026", "Gaji", "Pemasukan").with_plan(1000, 0))
        .unwrap();
    manager
        .add(row("02/03/2026", "Listrik", "Tagihan").with_plan(0, 200).with_actual(0, 300))
        .unwrap();

    let mut out = Vec::new();
    manager.export_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], EXPORT_HEADERS.join(","));
    assert!(lines[1].ends_with(NO_DATA));
    assert!(lines[2].ends_with(",-100"));
}

#[test]
fn json_export_reimports_the_same_rows() {
    let (mut source, _storage) = memory_manager();
    source
        .add(row("01/03/2026", "Gaji", "Pemasukan").with_plan(1000, 0))
        .unwrap();
    source
        .add(row("02/03/2026", "Listrik", "Tagihan").with_actual(0, 300))
        .unwrap();
    let mut out = Vec::new();
    source.export_json(&mut out).unwrap();

    let (mut target, _storage) = memory_manager();
    assert_eq!(target.import_json(out.as_slice()).unwrap(), 2);
    assert_eq!(target.transactions(), source.transactions());
}

#[test]
fn month_selection_builds_report_titles() {
    let (mut manager, _storage) = memory_manager();
    manager
        .add(row("15/02/2026", "Sewa", "Tagihan").with_plan(0, 1_000))
        .unwrap();
    manager
        .add(row("01/03/2026", "Gaji", "Pemasukan").with_plan(5_000, 0))
        .unwrap();
    assert_eq!(manager.available_months(), ["Februari 2026", "Maret 2026"]);

    let single = manager.export_selection(&["Maret 2026".to_string()]);
    assert_eq!(single.title, "Laporan Keuangan - Maret 2026");
    assert_eq!(single.rows.len(), 1);
    assert_eq!(single.totals.period_income, 5_000);

    let both = manager.export_selection(&manager.available_months());
    assert_eq!(both.title, "Ringkasan Laporan Keuangan Multibulan");
    assert_eq!(both.rows.len(), 2);
}

#[test]
fn extreme_imported_amounts_saturate_and_negatives_clamp() {
    let (mut manager, _storage) = memory_manager();
    let sheet = "\
Tanggal,Keterangan,Rencana Masuk,Rencana Keluar
01/03/2026,Warisan,9000000000000000000,0
02/03/2026,Lotre,9000000000000000000,-500
03/03/2026,Koreksi,0,-250
";
    assert_eq!(manager.import_csv(sheet.as_bytes()).expect("import"), 3);

    let rows = manager.transactions();
    assert!(rows.iter().all(|r| r.plan_expense == 0));

    let calculated = manager.calculated();
    assert_eq!(calculated[0].est_balance, 9_000_000_000_000_000_000);
    assert_eq!(calculated[1].est_balance, i64::MAX);
    assert_eq!(calculated[2].act_balance, i64::MAX);
    assert_eq!(manager.totals().period_income, i64::MAX);
    assert_eq!(manager.analytics().total_income, i64::MAX);
    assert_eq!(manager.grouped(GroupBy::Month)[0].income, i64::MAX);
}
