//! In-memory table-grid document
//!
//! A `SheetDocument` mirrors a word-processor document built from a label
//! template: a sequence of label tables separated by page breaks. Pages are
//! filled independently and then concatenated into one document.

use crate::template::LabelTemplate;
use crate::types::CellStyle;

/// One table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub text: String,
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set(&mut self, text: impl Into<String>, style: &CellStyle) {
        self.text = text.into();
        self.style = Some(style.clone());
    }
}

/// A fresh copy of a template's table
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    rows: Vec<Vec<Cell>>,
}

impl LabelTable {
    pub fn new(table_rows: usize, table_cols: usize) -> Self {
        Self {
            rows: vec![vec![Cell::default(); table_cols]; table_rows],
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    /// Non-empty cells as `(row, col, cell)`.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(c, cell)| (r, c, cell))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table(LabelTable),
    PageBreak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetDocument {
    blocks: Vec<Block>,
}

impl SheetDocument {
    /// Open a blank single-page document from `template`.
    pub fn open(template: &LabelTemplate) -> Self {
        Self {
            blocks: vec![Block::Table(LabelTable::new(
                template.table_rows,
                template.table_cols,
            ))],
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The table most recently added; cell writes go here.
    pub fn table_mut(&mut self) -> Option<&mut LabelTable> {
        self.blocks.iter_mut().rev().find_map(|block| match block {
            Block::Table(table) => Some(table),
            Block::PageBreak => None,
        })
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.table_mut()?.cell_mut(row, col)
    }

    pub fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }

    /// Move all of `other`'s content onto the end of this document.
    pub fn append(&mut self, other: SheetDocument) {
        self.blocks.extend(other.blocks);
    }

    pub fn tables(&self) -> impl Iterator<Item = &LabelTable> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            Block::PageBreak => None,
        })
    }

    /// Blocks grouped into physical pages.
    pub fn pages(&self) -> Vec<Vec<&LabelTable>> {
        let mut pages = vec![Vec::new()];
        for block in &self.blocks {
            match block {
                Block::Table(table) => {
                    if let Some(page) = pages.last_mut() {
                        page.push(table);
                    }
                }
                Block::PageBreak => pages.push(Vec::new()),
            }
        }
        pages
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Text of every filled cell in page order.
    pub fn texts(&self) -> Vec<&str> {
        self.tables()
            .flat_map(|table| table.filled_cells().map(|(_, _, cell)| cell.text.as_str()))
            .collect()
    }
}
