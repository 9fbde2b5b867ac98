mod common;

use std::fs;

use common::{at, record_with_bar_cash, reference_inputs, temp_store};
use nightly_close::{
    core::ClosureCalculator,
    export::{self, CsvOptions},
    storage::LedgerStore,
};

#[test]
fn reference_closure_flattens_to_one_row() {
    let mut raw = reference_inputs();
    raw.set_notes("Closing; DJ late");
    let record = ClosureCalculator::compute(&raw)
        .unwrap()
        .finalize(at(10, 2));

    let csv = export::to_csv(&[record], &CsvOptions::default()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("timestamp;totalRevenue;totalCosts;totalOwedToPartner;"));
    assert!(lines[0].ends_with(";extraCosts.vat;extraCosts.rent;notes"));
    insta::assert_snapshot!(lines[1], @r#"2025-05-10T02:15:00Z;155,00;358,00;158,00;50,00;50,00;30,00;80,00;20,00;100,00;40,00;10,00;50,00;5,00;5,00;80,00;0,00;60,00;0,00;40,00;0,00;0,00;20,00;200,00;5,00;10;50,00;0,00;0;0,00;0,00;0;0,00;0,00;0;0,00;0,00;0;0,00;8,00;100,00;"Closing; DJ late""#);
}

#[test]
fn empty_ledger_exports_header_only() {
    let csv = export::to_csv(&[], &CsvOptions::default()).unwrap();
    assert_eq!(csv, format!("{}\n", export::csv_header().join(";")));
    assert_eq!(export::csv_header().len(), 42);
}

#[test]
fn rows_follow_stored_order_and_configured_separators() {
    let records = vec![
        record_with_bar_cash(30, at(3, 22)),
        record_with_bar_cash(10, at(1, 22)),
    ];
    let options = CsvOptions {
        delimiter: b',',
        decimal_separator: '.',
    };
    let csv = export::to_csv(&records, &options).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("2025-05-03T22:15:00Z,30.00,"));
    assert!(rows[1].starts_with("2025-05-01T22:15:00Z,10.00,"));
}

#[test]
fn raw_export_is_byte_identical_to_the_ledger() {
    let (store, temp) = temp_store();
    store.append(&record_with_bar_cash(12, at(2, 23))).unwrap();
    store.append(&record_with_bar_cash(8, at(3, 23))).unwrap();

    let target = temp.path().join("exports").join("ledger.json");
    let data = export::raw_json(&store).unwrap();
    export::write_export(&target, &data).unwrap();

    assert_eq!(fs::read(&target).unwrap(), fs::read(store.path()).unwrap());
}

#[test]
fn raw_export_of_missing_ledger_is_empty_array() {
    let (store, _temp) = temp_store();
    assert_eq!(export::raw_json(&store).unwrap(), b"[]");
}
