use crate::geometry::{PageShape, SheetGeometry};

/// Label cells on a full sheet
pub fn max_labels_per_page(row_indices: &[usize], col_indices: &[usize]) -> usize {
    row_indices.len() * col_indices.len()
}

/// Label cells on a (possibly partial) first sheet.
///
/// Middle rows always use the full column set; only the first and last
/// physical rows are cut down.
pub fn max_labels_first_page(
    first_page_row_indices: &[usize],
    col_indices: &[usize],
    first_row_cols: &[usize],
    last_row_cols: &[usize],
) -> usize {
    match first_page_row_indices.len() {
        0 => 0,
        1 => first_row_cols.len(),
        2 => first_row_cols.len() + last_row_cols.len(),
        n => first_row_cols.len() + last_row_cols.len() + (n - 2) * col_indices.len(),
    }
}

/// Capacities computed once per run and reused for every page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetCapacity {
    pub first_page: usize,
    pub per_page: usize,
}

impl SheetCapacity {
    pub fn new(geometry: &SheetGeometry, first_page: &PageShape) -> Self {
        let capacity = Self {
            first_page: max_labels_first_page(
                &first_page.rows,
                &geometry.cols,
                &first_page.first_row_cols,
                &first_page.last_row_cols,
            ),
            per_page: max_labels_per_page(&geometry.rows, &geometry.cols),
        };
        log::debug!(
            "Sheet capacity: {} on first page, {} per page",
            capacity.first_page,
            capacity.per_page
        );
        capacity
    }

    /// Labels available on `pages` sheets, the first of which may be partial.
    pub fn total_for_pages(&self, pages: usize) -> usize {
        match pages {
            0 => 0,
            n => self.first_page + self.per_page * (n - 1),
        }
    }

    /// Sheets needed to hold `labels` labels (at least one).
    pub fn pages_for(&self, labels: usize) -> usize {
        if labels <= self.first_page || self.per_page == 0 {
            return 1;
        }
        1 + (labels - self.first_page).div_ceil(self.per_page)
    }
}
