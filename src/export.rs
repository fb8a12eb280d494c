// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turning a filtered collection into a CSV, XLSX or PDF file.
//!
//! All three formats share one field-extraction rule set:
//!
//! - `reference` is the item's id as text (empty if it has none)
//! - `crop` is the name of the related crop, or empty
//! - `amount` is the amount with exactly two decimals, `0.00` if missing
//! - anything else is the item's property of the same (camelCase) name,
//!   empty if absent and a blank cell if null
//!
//! An empty collection never produces a file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::models::{Activity, Expense};

const BOM: &str = "\u{feff}";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Null => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Written(PathBuf),
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("Unknown format: {} (use csv|excel|pdf)", other)),
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

pub fn extract_field(item: &Value, field: &str) -> Cell {
    match field {
        "reference" => Cell::Text(match item.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }),
        "crop" => Cell::Text(
            item.get("crop")
                .and_then(|c| c.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        "amount" => Cell::Text(
            match item
                .get("amount")
                .and_then(Value::as_f64)
                .and_then(Decimal::from_f64_retain)
            {
                // half-cents round up, not to even
                Some(a) => format!(
                    "{:.2}",
                    a.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                ),
                None => "0.00".to_string(),
            },
        ),
        other => match item.get(other) {
            None => Cell::Text(String::new()),
            Some(Value::Null) => Cell::Null,
            Some(Value::Number(n)) => Cell::Number(n.as_f64().unwrap_or_default()),
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(Value::Bool(b)) => Cell::Text(b.to_string()),
            Some(v) => Cell::Text(v.to_string()),
        },
    }
}

pub fn extract_rows<T: Serialize>(items: &[T], fields: &[&str]) -> Result<Vec<Vec<Cell>>> {
    items
        .iter()
        .map(|item| {
            let v = serde_json::to_value(item).context("Failed to serialize export row")?;
            Ok(fields.iter().map(|f| extract_field(&v, f)).collect())
        })
        .collect()
}

/// CSV text: BOM, bare header line, then one line per row. Text is always
/// quoted (inner quotes doubled), numbers never are, nulls become `""`.
pub fn encode_delimited(fields: &[&str], rows: &[Vec<Cell>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(fields.join(","));
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|c| match c {
                Cell::Null => "\"\"".to_string(),
                Cell::Number(n) => n.to_string(),
                Cell::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            })
            .collect();
        lines.push(cells.join(","));
    }
    format!("{}{}", BOM, lines.join("\n"))
}

/// Parse delimited text back into rows of strings (header row included).
pub fn decode_delimited(text: &str) -> Result<Vec<Vec<String>>> {
    let body = text.strip_prefix(BOM).unwrap_or(text);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.context("Malformed delimited text")?;
        out.push(rec.iter().map(str::to_string).collect());
    }
    Ok(out)
}

pub fn encode_spreadsheet(fields: &[&str], rows: &[Vec<Cell>]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Sheet1")?;

    for (c, f) in fields.iter().enumerate() {
        worksheet.write_string(0, c as u16, *f)?;
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Cell::Number(n) => {
                    worksheet.write_number(r, c as u16, *n)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(r, c as u16, s.as_str())?;
                }
                Cell::Null => {}
            }
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ROW_H: f32 = 6.0;
const BODY_PT: f32 = 8.0;

struct PdfFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// A4 table: title, header row, body rows in 8pt, "Generated on" footer on
/// every page. Long cells are clipped to their column.
pub fn encode_document(
    title: &str,
    fields: &[&str],
    rows: &[Vec<Cell>],
    generated_on: NaiveDate,
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let fonts = PdfFonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("PDF font error: {:?}", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("PDF font error: {:?}", e))?,
    };
    let col_w = (PAGE_W - 2.0 * MARGIN) / fields.len().max(1) as f32;
    // Helvetica averages roughly half an em per glyph.
    let max_chars = ((col_w / (BODY_PT * 0.5 * 0.3528)).floor() as usize).max(4);
    let footer = format!("Generated on: {}", generated_on.format("%d/%m/%Y"));

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = start_page(&current, &fonts, title, fields, col_w, max_chars, &footer);
    for row in rows {
        if y < MARGIN + ROW_H {
            let (p, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            current = doc.get_page(p).get_layer(l);
            y = start_page(&current, &fonts, title, fields, col_w, max_chars, &footer);
        }
        for (i, cell) in row.iter().enumerate() {
            current.use_text(
                clip(&cell.display(), max_chars),
                BODY_PT,
                Mm(MARGIN + i as f32 * col_w),
                Mm(y),
                &fonts.regular,
            );
        }
        y -= ROW_H;
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to render PDF: {:?}", e))
}

fn start_page(
    layer: &PdfLayerReference,
    fonts: &PdfFonts,
    title: &str,
    fields: &[&str],
    col_w: f32,
    max_chars: usize,
    footer: &str,
) -> f32 {
    layer.use_text(title, 15.0, Mm(MARGIN), Mm(PAGE_H - 15.0), &fonts.bold);
    layer.use_text(footer, BODY_PT, Mm(MARGIN), Mm(10.0), &fonts.regular);
    let header_y = PAGE_H - 27.0;
    for (i, f) in fields.iter().enumerate() {
        layer.use_text(
            clip(f, max_chars),
            BODY_PT,
            Mm(MARGIN + i as f32 * col_w),
            Mm(header_y),
            &fonts.bold,
        );
    }
    header_y - ROW_H
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_file(out_dir: &Path, filename: &str, format: ExportFormat, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.{}", filename, format.extension()));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "export written");
    Ok(path)
}

fn no_data(filename: &str) -> ExportOutcome {
    info!(filename, "nothing to export");
    ExportOutcome::NoData
}

pub fn to_delimited_text<T: Serialize>(
    items: &[T],
    fields: &[&str],
    filename: &str,
    out_dir: &Path,
) -> Result<ExportOutcome> {
    if items.is_empty() {
        return Ok(no_data(filename));
    }
    let rows = extract_rows(items, fields)?;
    let text = encode_delimited(fields, &rows);
    Ok(ExportOutcome::Written(write_file(
        out_dir,
        filename,
        ExportFormat::Csv,
        text.as_bytes(),
    )?))
}

pub fn to_spreadsheet<T: Serialize>(
    items: &[T],
    fields: &[&str],
    filename: &str,
    out_dir: &Path,
) -> Result<ExportOutcome> {
    if items.is_empty() {
        return Ok(no_data(filename));
    }
    let rows = extract_rows(items, fields)?;
    let bytes = encode_spreadsheet(fields, &rows)?;
    Ok(ExportOutcome::Written(write_file(
        out_dir,
        filename,
        ExportFormat::Excel,
        &bytes,
    )?))
}

pub fn to_document<T: Serialize>(
    items: &[T],
    fields: &[&str],
    filename: &str,
    out_dir: &Path,
    generated_on: NaiveDate,
) -> Result<ExportOutcome> {
    if items.is_empty() {
        return Ok(no_data(filename));
    }
    let rows = extract_rows(items, fields)?;
    let bytes = encode_document(&capitalize(filename), fields, &rows, generated_on)?;
    Ok(ExportOutcome::Written(write_file(
        out_dir,
        filename,
        ExportFormat::Pdf,
        &bytes,
    )?))
}

/// What the dashboard can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Expenses,
    Activities,
    All,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expenses" => Ok(ExportKind::Expenses),
            "activities" => Ok(ExportKind::Activities),
            "all" => Ok(ExportKind::All),
            other => Err(format!(
                "Unknown export '{}' (use expenses|activities|all)",
                other
            )),
        }
    }
}

impl ExportKind {
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            ExportKind::Expenses => &[
                "reference",
                "expenseTitle",
                "amount",
                "category",
                "expenseDate",
                "description",
            ],
            ExportKind::Activities => &["reference", "type", "date", "crop", "description"],
            ExportKind::All => &[
                "reference",
                "type",
                "amount",
                "category",
                "date",
                "description",
            ],
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            ExportKind::Expenses => "expenses",
            ExportKind::Activities => "activities",
            ExportKind::All => "all_data",
        }
    }
}

/// One line of the combined expenses + activities export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub id: Option<i64>,
    pub r#type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub date: String,
    pub description: String,
}

/// Expenses first, then activities (which carry no amount).
pub fn ledger(expenses: &[Expense], activities: &[Activity]) -> Vec<LedgerRow> {
    let exp = expenses.iter().map(|e| LedgerRow {
        id: e.id,
        r#type: "expense".to_string(),
        amount: e.amount_or_zero(),
        category: e.category.clone(),
        date: crate::utils::opt_date(e.expense_date),
        description: e.description.clone().unwrap_or_default(),
    });
    let act = activities.iter().map(|a| LedgerRow {
        id: a.id,
        r#type: a.r#type.clone(),
        amount: Decimal::ZERO,
        category: "activity".to_string(),
        date: crate::utils::opt_date(a.date),
        description: a.description.clone(),
    });
    exp.chain(act).collect()
}

fn export_items<T: Serialize>(
    items: &[T],
    kind: ExportKind,
    format: ExportFormat,
    out_dir: &Path,
    today: NaiveDate,
) -> Result<ExportOutcome> {
    let (fields, filename) = (kind.fields(), kind.filename());
    match format {
        ExportFormat::Csv => to_delimited_text(items, fields, filename, out_dir),
        ExportFormat::Excel => to_spreadsheet(items, fields, filename, out_dir),
        ExportFormat::Pdf => to_document(items, fields, filename, out_dir, today),
    }
}

/// Export the (already filtered) collections for `kind` in `format`.
pub fn export(
    kind: ExportKind,
    format: ExportFormat,
    expenses: &[Expense],
    activities: &[Activity],
    out_dir: &Path,
    today: NaiveDate,
) -> Result<ExportOutcome> {
    debug!(?kind, ?format, expenses = expenses.len(), activities = activities.len(), "export requested");
    match kind {
        ExportKind::Expenses => export_items(expenses, kind, format, out_dir, today),
        ExportKind::Activities => export_items(activities, kind, format, out_dir, today),
        ExportKind::All => export_items(&ledger(expenses, activities), kind, format, out_dir, today),
    }
}
