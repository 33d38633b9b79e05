//! Sheet geometry resolution
//!
//! Label sheet templates are tables whose cells alternate between label cells
//! and thin spacer cells. This module picks the content-bearing row/column
//! indices of a table and works out the shape of a partially consumed first
//! sheet.

use crate::types::{LabelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Arrangement
// =============================================================================

/// Which cells of the underlying table carry label content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Arrangement {
    /// Every row, every column
    #[default]
    FullGrid,
    /// Even rows and even columns; odd indices are spacers
    Checkerboard,
    /// Every row, even columns only
    Striped,
}

impl Arrangement {
    pub fn name(self) -> &'static str {
        match self {
            Arrangement::FullGrid => "grid",
            Arrangement::Checkerboard => "checkerboard",
            Arrangement::Striped => "striped",
        }
    }

    /// Whether table row `index` holds labels (as opposed to spacing).
    pub fn keeps_row(self, index: usize) -> bool {
        match self {
            Arrangement::FullGrid | Arrangement::Striped => true,
            Arrangement::Checkerboard => index % 2 == 0,
        }
    }

    /// Whether table column `index` holds labels.
    pub fn keeps_col(self, index: usize) -> bool {
        match self {
            Arrangement::FullGrid => true,
            Arrangement::Checkerboard | Arrangement::Striped => index % 2 == 0,
        }
    }
}

impl FromStr for Arrangement {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" | "full-grid" | "full_grid" | "fullgrid" => Ok(Arrangement::FullGrid),
            "checkerboard" => Ok(Arrangement::Checkerboard),
            "striped" => Ok(Arrangement::Striped),
            _ => Err(LabelError::UnknownArrangement(s.to_string())),
        }
    }
}

impl TryFrom<String> for Arrangement {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Arrangement> for String {
    fn from(value: Arrangement) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Usable row and column indices of a label sheet table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetGeometry {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub arrangement: Arrangement,
}

impl SheetGeometry {
    /// Resolve the content-bearing indices of a `table_rows` x `table_cols` table.
    pub fn resolve(table_rows: usize, table_cols: usize, arrangement: Arrangement) -> Self {
        let rows = (0..table_rows).filter(|&i| arrangement.keeps_row(i)).collect();
        let cols = (0..table_cols).filter(|&j| arrangement.keeps_col(j)).collect();
        Self {
            rows,
            cols,
            arrangement,
        }
    }

    /// Number of label rows on a sheet
    pub fn labels_down(&self) -> usize {
        self.rows.len()
    }

    /// Number of label columns on a sheet
    pub fn labels_across(&self) -> usize {
        self.cols.len()
    }

    /// Shape of every page after the first.
    pub fn full_page(&self) -> PageShape {
        PageShape {
            rows: self.rows.clone(),
            first_row_cols: self.cols.clone(),
            middle_cols: self.cols.clone(),
            last_row_cols: self.cols.clone(),
        }
    }

    /// Shape of the first page, truncated to `partial` when one is given.
    pub fn first_page(&self, partial: Option<&PartialRange>) -> Result<PageShape> {
        let Some(range) = partial else {
            return Ok(self.full_page());
        };
        range.validate(self)?;

        let rows = first_page_rows(range.start_row, range.end_row, &self.rows);
        let (first_row_cols, last_row_cols) = first_page_cols(
            range.start_col,
            range.end_col,
            range.start_row,
            range.end_row,
            &self.cols,
        );

        Ok(PageShape {
            rows,
            first_row_cols,
            middle_cols: self.cols.clone(),
            last_row_cols,
        })
    }
}

// =============================================================================
// Partial sheets
// =============================================================================

/// Where printing starts and stops on an already-used first sheet.
///
/// All positions are 1-based and inclusive, counted in label cells (spacers
/// are not counted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRange {
    #[serde(alias = "row_start")]
    pub start_row: usize,
    #[serde(alias = "row_end")]
    pub end_row: usize,
    #[serde(alias = "col_start")]
    pub start_col: usize,
    #[serde(alias = "col_end")]
    pub end_col: usize,
}

impl PartialRange {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    /// The whole sheet expressed as a range.
    pub fn full(geometry: &SheetGeometry) -> Self {
        Self::new(1, 1, geometry.labels_down(), geometry.labels_across())
    }

    pub fn validate(&self, geometry: &SheetGeometry) -> Result<()> {
        let down = geometry.labels_down();
        let across = geometry.labels_across();

        if self.start_row == 0 || self.end_row == 0 || self.start_col == 0 || self.end_col == 0 {
            return Err(LabelError::InvalidPartialRange(
                "rows and columns are numbered from 1".to_string(),
            ));
        }
        if self.end_row > down || self.start_row > down {
            return Err(LabelError::InvalidPartialRange(format!(
                "rows {}..{} exceed the {} label rows of the sheet",
                self.start_row, self.end_row, down
            )));
        }
        if self.end_col > across || self.start_col > across {
            return Err(LabelError::InvalidPartialRange(format!(
                "columns {}..{} exceed the {} label columns of the sheet",
                self.start_col, self.end_col, across
            )));
        }
        if self.start_row > self.end_row {
            return Err(LabelError::InvalidPartialRange(format!(
                "first row {} is after last row {}",
                self.start_row, self.end_row
            )));
        }
        if self.start_row == self.end_row && self.start_col > self.end_col {
            return Err(LabelError::InvalidPartialRange(format!(
                "first column {} is after last column {} on a single row",
                self.start_col, self.end_col
            )));
        }
        Ok(())
    }
}

/// Keep the entries of `rows` whose 1-based position lies in `start_row..=end_row`.
pub fn first_page_rows(start_row: usize, end_row: usize, rows: &[usize]) -> Vec<usize> {
    select_positions(rows, start_row, end_row)
}

/// Column subsets for the first and last physical rows of a partial range.
///
/// Returns `(first_row_cols, last_row_cols)`. A range spanning one row gets the
/// whole `start_col..=end_col` span on its first row and nothing on its last.
pub fn first_page_cols(
    start_col: usize,
    end_col: usize,
    start_row: usize,
    end_row: usize,
    cols: &[usize],
) -> (Vec<usize>, Vec<usize>) {
    if start_row == end_row {
        return (select_positions(cols, start_col, end_col), Vec::new());
    }
    (
        select_positions(cols, start_col, cols.len()),
        select_positions(cols, 1, end_col),
    )
}

fn select_positions(indices: &[usize], first: usize, last: usize) -> Vec<usize> {
    indices
        .iter()
        .enumerate()
        .filter(|(pos, _)| (first..=last).contains(&(pos + 1)))
        .map(|(_, &index)| index)
        .collect()
}

// =============================================================================
// Page shape
// =============================================================================

/// The cells of one physical page, in fill order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageShape {
    pub rows: Vec<usize>,
    pub first_row_cols: Vec<usize>,
    pub middle_cols: Vec<usize>,
    pub last_row_cols: Vec<usize>,
}

impl PageShape {
    /// Columns used by the row at `position` within `rows`.
    pub fn row_columns(&self, position: usize) -> &[usize] {
        if position == 0 {
            &self.first_row_cols
        } else if position + 1 == self.rows.len() {
            &self.last_row_cols
        } else {
            &self.middle_cols
        }
    }

    /// Table coordinates `(row, col)` in the order labels are written.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(pos, &row)| {
            self.row_columns(pos).iter().map(move |&col| (row, col))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
