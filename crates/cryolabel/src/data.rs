//! Record extraction from CSV and spreadsheet files
//!
//! Only the columns named by the format template's `{FIELD}` tokens are read,
//! in token order. A token whose name is not a header is dropped, which shifts
//! every later value one position left; templates must name real headers.

use crate::format::{DateFormat, TOKEN_RE};
use crate::types::{CellValue, LabelError, Record, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Datelike, NaiveDate, NaiveTime};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Formats tried, in order, when a text cell might hold a date
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%m-%Y", "%m/%d/%y",
    "%d/%m/%y", "%m-%d-%y", "%d-%m-%y", "%b %d, %Y", "%B %d, %Y",
];

/// Field names referenced by `format_template`, in order of appearance.
pub fn field_names(format_template: &str) -> Vec<String> {
    TOKEN_RE
        .captures_iter(format_template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Parse `value` with the first matching common date format, or keep it as text.
pub fn try_parse_date(value: &str) -> CellValue {
    let value = value.trim();
    if value.is_empty() {
        return CellValue::Empty;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            // %Y happily takes two digits; leave those to the %y formats
            if fmt.contains("%Y") && date.year() < 1000 {
                continue;
            }
            return CellValue::Date(date);
        }
    }
    CellValue::Text(value.to_string())
}

/// Drop repeated records, keeping the first occurrence of each.
pub fn remove_duplicates(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let before = records.len();
    let unique: Vec<Record> = records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect();
    if unique.len() < before {
        log::info!("Removed {} duplicate records", before - unique.len());
    }
    unique
}

fn text_value(text: &str, date_format: &DateFormat) -> CellValue {
    let text = text.trim();
    if text.is_empty() {
        CellValue::Empty
    } else if date_format.pattern().is_some() {
        try_parse_date(text)
    } else {
        CellValue::Text(text.to_string())
    }
}

/// Header positions of `fields`, skipping names with no matching header.
fn column_indices(headers: &[String], fields: &[String]) -> Vec<usize> {
    fields
        .iter()
        .filter_map(|field| {
            let index = headers.iter().position(|h| h == field);
            if index.is_none() {
                log::warn!("Field {field:?} is not a column header; skipping it");
            }
            index
        })
        .collect()
}

fn keep_row(record: &Record) -> bool {
    !record.iter().all(CellValue::is_empty)
}

// =============================================================================
// CSV
// =============================================================================

/// Read records from CSV data whose first row is the header.
pub fn records_from_csv<R: Read>(
    reader: R,
    format_template: &str,
    date_format: &DateFormat,
) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let indices = column_indices(&headers, &field_names(format_template));

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = indices
            .iter()
            .map(|&i| row.get(i).map_or(CellValue::Empty, |v| text_value(v, date_format)))
            .collect();
        if keep_row(&record) {
            records.push(record);
        }
    }
    Ok(records)
}

// =============================================================================
// Spreadsheets
// =============================================================================

/// Convert one spreadsheet cell.
pub fn spreadsheet_value(cell: &Data, date_format: &DateFormat) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => text_value(s, date_format),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            CellValue::Text(format!("{}", *f as i64))
        }
        Data::Float(f) => CellValue::Text(f.to_string()),
        Data::Int(i) => CellValue::Text(i.to_string()),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if date_format.pattern().is_none() => {
                CellValue::Text(datetime.to_string())
            }
            Some(datetime) if datetime.time() == NaiveTime::MIN => {
                CellValue::Date(datetime.date())
            }
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Text(cell.to_string()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

/// Read records from a worksheet range whose first row is the header.
pub fn records_from_range(
    range: &Range<Data>,
    format_template: &str,
    date_format: &DateFormat,
) -> Vec<Record> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
    let indices = column_indices(&headers, &field_names(format_template));

    rows.map(|row| {
        indices
            .iter()
            .map(|&i| {
                row.get(i)
                    .map_or(CellValue::Empty, |cell| spreadsheet_value(cell, date_format))
            })
            .collect::<Record>()
    })
    .filter(keep_row)
    .collect()
}

fn records_from_workbook(
    path: &Path,
    format_template: &str,
    date_format: &DateFormat,
) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };
    Ok(records_from_range(&range, format_template, date_format))
}

// =============================================================================
// Entry point
// =============================================================================

enum SourceKind {
    Csv,
    Spreadsheet,
}

fn source_kind(path: &Path) -> Result<SourceKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(SourceKind::Csv),
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceKind::Spreadsheet),
        _ => Err(LabelError::UnsupportedFileType(path.display().to_string())),
    }
}

/// Load the records named by `format_template` from a CSV or spreadsheet file.
pub async fn load_records(
    path: impl AsRef<Path>,
    format_template: &str,
    date_format: &DateFormat,
) -> Result<Vec<Record>> {
    let path: PathBuf = path.as_ref().to_owned();
    let kind = source_kind(&path)?;
    let format_template = format_template.to_string();
    let date_format = date_format.clone();

    let records = match kind {
        SourceKind::Csv => {
            let contents = tokio::fs::read(&path).await?;
            tokio::task::spawn_blocking(move || {
                records_from_csv(contents.as_slice(), &format_template, &date_format)
            })
            .await??
        }
        SourceKind::Spreadsheet => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || {
                records_from_workbook(&path, &format_template, &date_format)
            })
            .await??
        }
    };

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
