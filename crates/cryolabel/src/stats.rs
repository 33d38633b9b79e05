use crate::capacity::SheetCapacity;
use crate::types::*;

/// How `item_count` labels at `copies` each spread over sheets of `capacity`
pub(crate) fn layout_statistics(
    capacity: &SheetCapacity,
    item_count: usize,
    copies: usize,
) -> Result<LayoutStatistics> {
    if copies == 0 {
        return Err(LabelError::InvalidCopies(
            "at least one copy per label is required".to_string(),
        ));
    }

    let total_labels = item_count * copies;
    let pages = capacity.pages_for(total_labels);

    // Same rule the paginator enforces once labels spill past the first sheet
    if pages > 1 && copies > capacity.per_page {
        return Err(LabelError::Capacity {
            copies,
            capacity: capacity.per_page,
        });
    }

    let (labels_on_last_page, last_page_capacity) = if pages == 1 {
        (total_labels, capacity.first_page)
    } else {
        (
            total_labels - capacity.total_for_pages(pages - 1),
            capacity.per_page,
        )
    };

    Ok(LayoutStatistics {
        first_page_capacity: capacity.first_page,
        page_capacity: capacity.per_page,
        total_labels,
        pages,
        labels_on_last_page,
        blank_cells_on_last_page: last_page_capacity.saturating_sub(labels_on_last_page),
    })
}
