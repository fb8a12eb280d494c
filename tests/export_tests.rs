// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use farmbook::export::{
    self, Cell, ExportFormat, ExportKind, ExportOutcome, decode_delimited, encode_delimited,
    extract_field, extract_rows, ledger, to_delimited_text, to_document, to_spreadsheet,
};
use farmbook::models::{Activity, Crop, Expense};
use serde_json::json;
use tempfile::tempdir;

fn generated_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn expenses() -> Vec<Expense> {
    serde_json::from_value(json!([
        {"id": 7, "expenseTitle": "Seeds, \"hybrid\"", "amount": 12, "category": "Seeds", "expenseDate": "2025-03-01", "description": null},
        {"id": 8, "expenseTitle": "Diesel", "amount": 99.5, "category": "Fuel", "expenseDate": "2025-03-04", "description": "tractor"}
    ]))
    .unwrap()
}

fn activities() -> Vec<Activity> {
    serde_json::from_value(json!([
        {"id": 3, "type": "Irrigation", "description": "drip", "date": "2025-03-02", "crop": {"id": 1, "name": "Wheat"}},
        {"id": 4, "type": "Weeding", "description": "", "date": "2025-03-05", "crop": null}
    ]))
    .unwrap()
}

#[test]
fn field_extraction_rules() {
    let item = json!({"id": 7, "amount": 12, "crop": null, "name": "Wheat"});
    assert_eq!(extract_field(&item, "reference"), Cell::Text("7".into()));
    assert_eq!(extract_field(&item, "amount"), Cell::Text("12.00".into()));
    assert_eq!(extract_field(&item, "crop"), Cell::Text(String::new()));
    assert_eq!(extract_field(&item, "name"), Cell::Text("Wheat".into()));

    let bare = json!({});
    assert_eq!(extract_field(&bare, "reference"), Cell::Text(String::new()));
    assert_eq!(extract_field(&bare, "amount"), Cell::Text("0.00".into()));
}

#[test]
fn half_cent_amounts_round_up() {
    let items = vec![json!({"amount": 10.125}), json!({"amount": 2.625})];
    let rows = extract_rows(&items, &["amount"]).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Cell::Text("10.13".into())],
            vec![Cell::Text("2.63".into())]
        ]
    );
    assert_eq!(
        extract_field(&json!({"amount": -2.625}), "amount"),
        Cell::Text("-2.63".into())
    );
}

#[test]
fn numeric_cells_are_written_unquoted() {
    let crops: Vec<Crop> = serde_json::from_value(json!([
        {"id": 1, "name": "Wheat", "variety": "HD", "area": 2.5, "plantingDate": "2025-01-10"},
        {"id": 2, "name": "Rice", "variety": "Basmati", "area": 2.0, "plantingDate": "2024-07-01"}
    ]))
    .unwrap();
    let fields = ["reference", "name", "area"];
    let rows = extract_rows(&crops, &fields).unwrap();
    let text = encode_delimited(&fields, &rows);
    let lines: Vec<_> = text.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(lines, vec!["reference,name,area", r#""1","Wheat",2.5"#, r#""2","Rice",2"#]);
}

#[test]
fn null_properties_become_blank_cells() {
    let crops: Vec<Crop> = serde_json::from_value(json!([
        {"id": 1, "name": "Wheat", "variety": "HD", "area": 2.5, "notes": null}
    ]))
    .unwrap();
    let fields = ["name", "notes"];
    let rows = extract_rows(&crops, &fields).unwrap();
    assert_eq!(rows[0][1], Cell::Null);
    let text = encode_delimited(&fields, &rows);
    assert!(text.ends_with(r#""Wheat","""#));
    let dir = tempdir().unwrap();
    let out = to_spreadsheet(&crops, &fields, "crops", dir.path()).unwrap();
    assert_eq!(out, ExportOutcome::Written(dir.path().join("crops.xlsx")));
}

#[test]
fn delimited_text_starts_with_bom_and_bare_header() {
    let fields = ExportKind::Expenses.fields();
    let rows = extract_rows(&expenses(), fields).unwrap();
    let text = encode_delimited(fields, &rows);
    assert!(text.starts_with('\u{feff}'));
    let first_line = text.trim_start_matches('\u{feff}').lines().next().unwrap();
    assert_eq!(
        first_line,
        "reference,expenseTitle,amount,category,expenseDate,description"
    );
    assert!(text.contains(r#""Seeds, ""hybrid""""#));
}

#[test]
fn delimited_text_reads_back_through_a_csv_parser() {
    let fields = ExportKind::Expenses.fields();
    let rows = extract_rows(&expenses(), fields).unwrap();
    let decoded = decode_delimited(&encode_delimited(fields, &rows)).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0], fields.iter().map(|f| f.to_string()).collect::<Vec<_>>());
    assert_eq!(
        decoded[1],
        vec!["7", "Seeds, \"hybrid\"", "12.00", "Seeds", "2025-03-01", ""]
    );
    assert_eq!(decoded[2][2], "99.50");
    assert_eq!(decoded[2][5], "tractor");
}

#[test]
fn empty_collections_write_nothing() {
    let dir = tempdir().unwrap();
    let fields = ExportKind::Expenses.fields();
    let none: Vec<Expense> = Vec::new();
    assert_eq!(
        to_delimited_text(&none, fields, "expenses", dir.path()).unwrap(),
        ExportOutcome::NoData
    );
    assert_eq!(
        to_spreadsheet(&none, fields, "expenses", dir.path()).unwrap(),
        ExportOutcome::NoData
    );
    assert_eq!(
        to_document(&none, fields, "expenses", dir.path(), generated_on()).unwrap(),
        ExportOutcome::NoData
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn spreadsheet_is_a_zip_container() {
    let dir = tempdir().unwrap();
    let out = to_spreadsheet(&expenses(), ExportKind::Expenses.fields(), "expenses", dir.path())
        .unwrap();
    let ExportOutcome::Written(path) = out else {
        panic!("expected a file");
    };
    assert_eq!(path, dir.path().join("expenses.xlsx"));
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn document_is_a_pdf() {
    let dir = tempdir().unwrap();
    let out = to_document(
        &activities(),
        ExportKind::Activities.fields(),
        "activities",
        dir.path(),
        generated_on(),
    )
    .unwrap();
    let ExportOutcome::Written(path) = out else {
        panic!("expected a file");
    };
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
    assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));
}

#[test]
fn long_document_paginates() {
    let many: Vec<Activity> = (0..200)
        .map(|i| Activity {
            id: Some(i),
            r#type: "Irrigation".into(),
            description: "x".repeat(80),
            date: Some(generated_on()),
            ..Activity::default()
        })
        .collect();
    let rows = extract_rows(&many, ExportKind::Activities.fields()).unwrap();
    let bytes = export::encode_document(
        "Activities",
        ExportKind::Activities.fields(),
        &rows,
        generated_on(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn activity_export_uses_crop_names() {
    let dir = tempdir().unwrap();
    let out = export::export(
        ExportKind::Activities,
        ExportFormat::Csv,
        &[],
        &activities(),
        dir.path(),
        generated_on(),
    )
    .unwrap();
    let ExportOutcome::Written(path) = out else {
        panic!("expected a file");
    };
    assert_eq!(path.file_name().unwrap(), "activities.csv");
    let decoded = decode_delimited(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(decoded[1], vec!["3", "Irrigation", "2025-03-02", "Wheat", "drip"]);
    assert_eq!(decoded[2][3], "");
}

#[test]
fn combined_export_lists_expenses_then_activities() {
    let rows = ledger(&expenses(), &activities());
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].r#type, "expense");
    assert_eq!(rows[2].category, "activity");
    assert!(rows[2].amount.is_zero());

    let dir = tempdir().unwrap();
    let out = export::export(
        ExportKind::All,
        ExportFormat::Csv,
        &expenses(),
        &activities(),
        dir.path(),
        generated_on(),
    )
    .unwrap();
    assert_eq!(out, ExportOutcome::Written(dir.path().join("all_data.csv")));
}

#[test]
fn unknown_format_is_rejected() {
    assert!("xml".parse::<ExportFormat>().is_err());
    assert_eq!("XLSX".parse::<ExportFormat>(), Ok(ExportFormat::Excel));
}
