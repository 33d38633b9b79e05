use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Preset error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Unknown sheet arrangement: {0:?} (expected grid, checkerboard or striped)")]
    UnknownArrangement(String),
    #[error("Unknown label template: {0:?}")]
    UnknownTemplate(String),
    #[error("Unsupported file type: {0:?} (expected .csv, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFileType(String),
    #[error("Invalid partial sheet range: {0}")]
    InvalidPartialRange(String),
    #[error("Invalid copies per label: {0}")]
    InvalidCopies(String),
    #[error("Invalid starting serial {0:?}: must end in a number (e.g. AB-001)")]
    InvalidSerial(String),
    #[error("No labels to print")]
    NoLabels,
    #[error("{copies} copies per label cannot fit on a page holding {capacity} labels")]
    Capacity { copies: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, LabelError>;

/// A single scalar pulled from a data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    Empty,
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// One data row, positionally aligned with the `{}` tokens of a format template.
pub type Record = Vec<CellValue>;

/// What ends up in exactly one physical label cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelItem {
    /// Written verbatim (identical and incremental text modes).
    Literal(String),
    /// Expanded through the preset's format template.
    Record(Record),
}

impl From<Record> for LabelItem {
    fn from(record: Record) -> Self {
        LabelItem::Record(record)
    }
}

impl From<String> for LabelItem {
    fn from(text: String) -> Self {
        LabelItem::Literal(text)
    }
}

/// Horizontal alignment of text inside a label cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum TextAlignment {
    #[serde(alias = "left", alias = "LEFT")]
    Left,
    #[default]
    #[serde(alias = "center", alias = "CENTER", alias = "Centre")]
    Center,
    #[serde(alias = "right", alias = "RIGHT")]
    Right,
}

/// Styling applied to every written cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font_name: String,
    pub font_size_pt: f32,
    pub bold: bool,
    pub alignment: TextAlignment,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size_pt: 6.0,
            bold: true,
            alignment: TextAlignment::Center,
        }
    }
}

/// Summary of how a run will lay out across sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutStatistics {
    pub first_page_capacity: usize,
    pub page_capacity: usize,
    pub total_labels: usize,
    pub pages: usize,
    pub labels_on_last_page: usize,
    pub blank_cells_on_last_page: usize,
}
