//! Distribution of label copies across sheets
//!
//! Each record expands into a copy-group of `copies_per_label` identical
//! labels. Pages are filled in record order; when a copy-group does not fit in
//! what is left of a page, its tail (the "hangover") opens the next page rather
//! than leaving cells empty.

use crate::types::{LabelError, Result};
use std::slice;

/// Labels split into a (possibly partial) first page and full follow-up pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination<T> {
    pub first_page: Vec<T>,
    pub other_pages: Vec<Vec<T>>,
}

impl<T> Pagination<T> {
    pub fn page_count(&self) -> usize {
        1 + self.other_pages.len()
    }

    pub fn total_items(&self) -> usize {
        self.first_page.len() + self.other_pages.iter().map(Vec::len).sum::<usize>()
    }

    /// All pages, first page included, in print order.
    pub fn into_pages(self) -> Vec<Vec<T>> {
        let mut pages = Vec::with_capacity(self.page_count());
        pages.push(self.first_page);
        pages.extend(self.other_pages);
        pages
    }
}

/// Repeat every record `copies_per_label` times, keeping record order.
pub fn expand<T: Clone>(records: &[T], copies_per_label: usize) -> Vec<T> {
    records
        .iter()
        .flat_map(|record| std::iter::repeat_n(record, copies_per_label))
        .cloned()
        .collect()
}

/// Split `records` x `copies_per_label` labels into pages.
///
/// Fails when `copies_per_label` is zero, or when follow-up pages are needed and
/// a single copy-group would not fit on one of them.
pub fn paginate<T: Clone>(
    first_page_capacity: usize,
    page_capacity: usize,
    records: &[T],
    copies_per_label: usize,
) -> Result<Pagination<T>> {
    if copies_per_label == 0 {
        return Err(LabelError::InvalidCopies(
            "at least one copy per label is required".to_string(),
        ));
    }

    let total_items = records.len() * copies_per_label;

    if total_items <= first_page_capacity {
        log::debug!("All {total_items} labels fit on the first page");
        return Ok(Pagination {
            first_page: expand(records, copies_per_label),
            other_pages: Vec::new(),
        });
    }

    if copies_per_label > page_capacity {
        return Err(LabelError::Capacity {
            copies: copies_per_label,
            capacity: page_capacity,
        });
    }

    let additional_pages = (total_items - first_page_capacity).div_ceil(page_capacity);
    log::debug!(
        "{total_items} labels need {} pages ({first_page_capacity} on the first, {page_capacity} per page after)",
        additional_pages + 1
    );

    let mut remaining = records.iter();
    let mut hangover = Vec::new();

    let first_page = fill_page(
        Vec::with_capacity(first_page_capacity),
        first_page_capacity,
        &mut remaining,
        copies_per_label,
        &mut hangover,
    );

    let mut other_pages = Vec::with_capacity(additional_pages);
    while !hangover.is_empty() || remaining.len() > 0 {
        let mut page = Vec::with_capacity(page_capacity);
        page.append(&mut hangover);
        other_pages.push(fill_page(
            page,
            page_capacity,
            &mut remaining,
            copies_per_label,
            &mut hangover,
        ));
    }

    debug_assert_eq!(other_pages.len(), additional_pages);

    Ok(Pagination {
        first_page,
        other_pages,
    })
}

/// Top up `page` with whole copy-groups until it reaches `capacity`.
///
/// The last group may overshoot; the overshoot is moved into `hangover`.
fn fill_page<T: Clone>(
    mut page: Vec<T>,
    capacity: usize,
    remaining: &mut slice::Iter<'_, T>,
    copies_per_label: usize,
    hangover: &mut Vec<T>,
) -> Vec<T> {
    let free = capacity.saturating_sub(page.len());
    let groups = free.div_ceil(copies_per_label);

    for record in remaining.by_ref().take(groups) {
        page.extend(std::iter::repeat_n(record, copies_per_label).cloned());
    }

    if page.len() > capacity {
        *hangover = page.split_off(capacity);
    }
    page
}
