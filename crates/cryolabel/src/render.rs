//! Page rendering and document assembly
//!
//! Each page's labels are written into a fresh copy of the template table in
//! fill order (first row's columns, middle rows, last row's columns). The
//! finished pages are then chained into one document with page breaks between
//! them.

use crate::document::SheetDocument;
use crate::format::{DateFormat, apply_format};
use crate::geometry::PageShape;
use crate::template::LabelTemplate;
use crate::types::{CellStyle, LabelError, LabelItem, Result};

/// Everything a page needs besides its labels
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub template: &'a LabelTemplate,
    pub format_template: &'a str,
    pub date_format: &'a DateFormat,
    pub style: &'a CellStyle,
}

impl RenderContext<'_> {
    /// Text written into a cell for `item`.
    pub fn cell_text(&self, item: &LabelItem) -> String {
        match item {
            LabelItem::Literal(text) => text.clone(),
            LabelItem::Record(record) => {
                apply_format(self.format_template, record, self.date_format)
            }
        }
    }
}

/// Fill one sheet. Stops early when `items` runs out.
pub fn render_page(
    items: &[LabelItem],
    shape: &PageShape,
    ctx: &RenderContext<'_>,
) -> Result<SheetDocument> {
    let mut doc = SheetDocument::open(ctx.template);
    let mut written = 0;

    for (item, (row, col)) in items.iter().zip(shape.cells()) {
        let cell = doc.cell_mut(row, col).ok_or_else(|| {
            LabelError::Config(format!(
                "cell ({row}, {col}) is outside template {:?}",
                ctx.template.key
            ))
        })?;
        let text = ctx.cell_text(item);
        if !ctx.template.fits_text(&text) {
            log::warn!(
                "Label {text:?} may overflow its cell on {} ({} lines of {} characters)",
                ctx.template.key,
                ctx.template.lines_per_label,
                ctx.template.chars_per_line
            );
        }
        cell.set(text, ctx.style);
        written += 1;
    }

    if written < items.len() {
        return Err(LabelError::Config(format!(
            "{} labels were assigned to a page with {written} cells",
            items.len()
        )));
    }

    Ok(doc)
}

/// Render the first page with `first_shape` and the rest with `full_shape`.
pub fn render_pages(
    pages: &[Vec<LabelItem>],
    first_shape: &PageShape,
    full_shape: &PageShape,
    ctx: &RenderContext<'_>,
) -> Result<Vec<SheetDocument>> {
    pages
        .iter()
        .enumerate()
        .map(|(i, items)| {
            let shape = if i == 0 { first_shape } else { full_shape };
            log::debug!("Rendering page {} with {} labels", i + 1, items.len());
            render_page(items, shape, ctx)
        })
        .collect()
}

/// Chain pages into one document, with a page break after all but the last.
pub fn assemble(pages: Vec<SheetDocument>) -> Option<SheetDocument> {
    let mut pages = pages.into_iter();
    let mut final_doc = pages.next()?;
    for page in pages {
        final_doc.add_page_break();
        final_doc.append(page);
    }
    Some(final_doc)
}
