//! Generation entry points
//!
//! `build_document` is the pure core: it takes already-loaded labels and
//! produces the assembled document. `generate_labels` wraps it with the I/O on
//! either side and only writes a file once the whole document exists.

use crate::capacity::SheetCapacity;
use crate::data::{load_records, remove_duplicates};
use crate::document::SheetDocument;
use crate::geometry::{PageShape, PartialRange};
use crate::io::{save_document, target_path};
use crate::paginate::paginate;
use crate::pdf::render_pdf_bytes;
use crate::render::{RenderContext, assemble, render_pages};
use crate::serial::{is_valid_serial_format, parse_seed};
use crate::spec::{GenerateRequest, LabelSpec, PresetType, TextMode, resolve_template};
use crate::stats::layout_statistics;
use crate::template::{LabelTemplate, TemplateRegistry};
use crate::types::*;
use std::path::PathBuf;

/// Label content for one run
#[derive(Debug, Clone, PartialEq)]
pub enum LabelSource {
    /// Rows loaded from a data file
    Records(Vec<Record>),
    /// One literal string repeated
    Identical(String),
    /// Starting serial for a run of incrementing serials
    Incremental(String),
}

/// Page shapes and capacities for one run
struct SheetPlan {
    first_shape: PageShape,
    full_shape: PageShape,
    capacity: SheetCapacity,
}

impl SheetPlan {
    fn new(template: &LabelTemplate, partial: Option<&PartialRange>) -> Result<Self> {
        let geometry = template.geometry();
        let first_shape = geometry.first_page(partial)?;
        let capacity = SheetCapacity::new(&geometry, &first_shape);
        Ok(Self {
            first_shape,
            full_shape: geometry.full_page(),
            capacity,
        })
    }
}

/// Turn `source` into label items plus the copy count to paginate them with.
fn label_items(
    spec: &LabelSpec,
    capacity: &SheetCapacity,
    source: LabelSource,
    copies: Option<usize>,
) -> Result<(Vec<LabelItem>, usize)> {
    if copies == Some(0) {
        return Err(LabelError::InvalidCopies(
            "at least one copy per label is required".to_string(),
        ));
    }

    match source {
        LabelSource::Records(records) => {
            let records = if spec.remove_duplicates {
                remove_duplicates(records)
            } else {
                records
            };
            let items = records.into_iter().map(LabelItem::Record).collect();
            Ok((items, copies.unwrap_or(1)))
        }
        LabelSource::Identical(text) => {
            // Blank copies fills the first sheet
            let count = copies.unwrap_or(capacity.first_page);
            Ok((vec![LabelItem::Literal(text); count], 1))
        }
        LabelSource::Incremental(seed) => {
            let seed = seed.trim();
            if !is_valid_serial_format(seed) {
                return Err(LabelError::InvalidSerial(seed.to_string()));
            }
            let seed = parse_seed(seed)?;
            let copies = copies.unwrap_or(1);
            let serial_count = capacity.total_for_pages(spec.pages) / copies;
            log::debug!(
                "Generating {serial_count} serials from {} with {copies} copies each",
                seed.format(seed.start)
            );

            let items = seed
                .generate(serial_count)
                .into_iter()
                .map(LabelItem::Literal)
                .collect();
            Ok((items, copies))
        }
    }
}

/// Lay out `source` on sheets of `template` and assemble the finished document.
pub fn build_document(
    spec: &LabelSpec,
    template: &LabelTemplate,
    source: LabelSource,
    request: &GenerateRequest,
) -> Result<SheetDocument> {
    let partial = request.partial_range(spec);
    let plan = SheetPlan::new(template, partial.as_ref())?;
    let (items, copies) = label_items(spec, &plan.capacity, source, request.copies(spec))?;

    if items.is_empty() {
        return Err(LabelError::NoLabels);
    }

    let pagination = paginate(
        plan.capacity.first_page,
        plan.capacity.per_page,
        &items,
        copies,
    )?;
    log::info!(
        "Laying out {} labels on {} sheets of {}",
        pagination.total_items(),
        pagination.page_count(),
        template.key
    );

    let style = spec.cell_style();
    let ctx = RenderContext {
        template,
        format_template: &spec.format_template,
        date_format: &spec.date_format,
        style: &style,
    };
    let pages = render_pages(
        &pagination.into_pages(),
        &plan.first_shape,
        &plan.full_shape,
        &ctx,
    )?;

    assemble(pages).ok_or(LabelError::NoLabels)
}

/// Layout statistics for `source` without rendering anything.
pub fn plan_labels(
    spec: &LabelSpec,
    template: &LabelTemplate,
    source: LabelSource,
    request: &GenerateRequest,
) -> Result<LayoutStatistics> {
    let partial = request.partial_range(spec);
    let plan = SheetPlan::new(template, partial.as_ref())?;
    let (items, copies) = label_items(spec, &plan.capacity, source, request.copies(spec))?;
    layout_statistics(&plan.capacity, items.len(), copies)
}

/// Read the labels a preset asks for from the request's file or text.
pub async fn load_source(spec: &LabelSpec, request: &GenerateRequest) -> Result<LabelSource> {
    match spec.preset_type {
        PresetType::File => {
            let path = request.input_path.as_ref().ok_or_else(|| {
                LabelError::Config(format!("preset {:?} needs an input file", spec.name))
            })?;
            let records = load_records(path, &spec.format_template, &spec.date_format).await?;
            Ok(LabelSource::Records(records))
        }
        PresetType::Text => {
            let text = request.text.clone().ok_or_else(|| {
                LabelError::Config(format!("preset {:?} needs label text", spec.name))
            })?;
            Ok(match spec.text_mode {
                TextMode::Identical => LabelSource::Identical(text),
                TextMode::Incremental => LabelSource::Incremental(text),
            })
        }
    }
}

/// Run a preset end to end and return the path of the written PDF.
pub async fn generate_labels(
    spec: &LabelSpec,
    registry: &TemplateRegistry,
    request: &GenerateRequest,
) -> Result<PathBuf> {
    let template = resolve_template(spec, registry)?.clone();
    let source = load_source(spec, request).await?;

    let title = if spec.name.is_empty() {
        template.display_name.clone()
    } else {
        spec.name.clone()
    };

    let bytes = {
        let spec = spec.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || {
            let doc = build_document(&spec, &template, source, &request)?;
            log::debug!("Document has {} pages", doc.page_count());
            render_pdf_bytes(&doc, &template, &title)
        })
        .await??
    };

    save_document(target_path(spec, request), bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DateFormat;
    use crate::spec::Copies;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::builtin()
    }

    fn spec(template: &str) -> LabelSpec {
        LabelSpec {
            template: template.to_string(),
            ..LabelSpec::default()
        }
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n).map(|i| vec![CellValue::from(format!("S{i}"))]).collect()
    }

    #[test]
    fn test_identical_blank_copies_fills_first_page() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            preset_type: PresetType::Text,
            copies: Copies::Fill,
            ..spec("address-2.63x1")
        };
        let request = GenerateRequest {
            partial_range: Some(PartialRange::new(9, 1, 10, 3)),
            ..GenerateRequest::default()
        };
        let doc = build_document(&spec, template, LabelSource::Identical("X".into()), &request)
            .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.texts().len(), 6);
    }

    #[test]
    fn test_identical_with_count_spills_over() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            copies: Copies::Counts(vec![35]),
            ..spec("address-2.63x1")
        };
        let doc = build_document(
            &spec,
            template,
            LabelSource::Identical("X".into()),
            &GenerateRequest::default(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.texts().len(), 35);
    }

    #[test]
    fn test_incremental_fills_requested_pages() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            text_mode: TextMode::Incremental,
            copies: Copies::Counts(vec![4]),
            pages: 2,
            ..spec("address-2.63x1")
        };
        let doc = build_document(
            &spec,
            template,
            LabelSource::Incremental("AB-0098".into()),
            &GenerateRequest::default(),
        )
        .unwrap();
        // 60 cells / 4 copies = 15 serials
        let texts = doc.texts();
        assert_eq!(texts.len(), 60);
        assert_eq!(&texts[..5], &["AB-0098", "AB-0098", "AB-0098", "AB-0098", "AB-0099"]);
        assert_eq!(texts[59], "AB-0112");
    }

    #[test]
    fn test_incremental_rejects_oversized_copy_group() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            text_mode: TextMode::Incremental,
            copies: Copies::Counts(vec![65]),
            pages: 3,
            ..spec("address-2.63x1")
        };
        let result = build_document(
            &spec,
            template,
            LabelSource::Incremental("A001".into()),
            &GenerateRequest::default(),
        );
        assert!(matches!(result, Err(LabelError::Capacity { copies: 65, capacity: 30 })));
    }

    #[test]
    fn test_incremental_rejects_bad_seed() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = spec("address-2.63x1");
        for seed in ["no-digits", "TOOLONGPREFIX-1"] {
            let result = build_document(
                &spec,
                template,
                LabelSource::Incremental(seed.into()),
                &GenerateRequest::default(),
            );
            assert!(matches!(result, Err(LabelError::InvalidSerial(_))));
        }
    }

    #[test]
    fn test_records_with_duplicates_removed() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            format_template: "{ID}".to_string(),
            remove_duplicates: true,
            copies: Copies::Counts(vec![2]),
            ..spec("address-2.63x1")
        };
        let mut data = records(3);
        data.push(data[0].clone());
        let doc = build_document(&spec, template, LabelSource::Records(data), &GenerateRequest::default())
            .unwrap();
        assert_eq!(doc.texts(), vec!["S0", "S0", "S1", "S1", "S2", "S2"]);
    }

    #[test]
    fn test_copy_override_and_oversized_group() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            format_template: "{ID}".to_string(),
            ..spec("address-2.63x1")
        };
        let request = GenerateRequest {
            copies: Some(31),
            ..GenerateRequest::default()
        };
        let result = build_document(&spec, template, LabelSource::Records(records(2)), &request);
        assert!(matches!(result, Err(LabelError::Capacity { copies: 31, capacity: 30 })));

        let request = GenerateRequest {
            copies: Some(0),
            ..GenerateRequest::default()
        };
        let result = build_document(&spec, template, LabelSource::Records(records(2)), &request);
        assert!(matches!(result, Err(LabelError::InvalidCopies(_))));
    }

    #[test]
    fn test_no_records_is_an_error() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let result = build_document(
            &spec("address-2.63x1"),
            template,
            LabelSource::Records(Vec::new()),
            &GenerateRequest::default(),
        );
        assert!(matches!(result, Err(LabelError::NoLabels)));
    }

    #[test]
    fn test_plan_labels_for_incremental() {
        let registry = registry();
        let template = registry.get("cryo-1.28x0.5").unwrap();
        let spec = LabelSpec {
            text_mode: TextMode::Incremental,
            copies: Copies::Counts(vec![5]),
            pages: 3,
            ..spec("cryo-1.28x0.5")
        };
        let stats = plan_labels(
            &spec,
            template,
            LabelSource::Incremental("7".into()),
            &GenerateRequest::default(),
        )
        .unwrap();
        // 252 cells / 5 copies = 50 serials, 250 labels
        assert_eq!(stats.total_labels, 250);
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.blank_cells_on_last_page, 2);
    }

    #[test]
    fn test_plan_labels_uses_partial_range() {
        let registry = registry();
        let template = registry.get("address-2.63x1").unwrap();
        let spec = LabelSpec {
            format_template: "{ID}".to_string(),
            partial_sheet: true,
            partial_range: Some(PartialRange::new(10, 2, 10, 3)),
            ..spec("address-2.63x1")
        };
        let stats = plan_labels(
            &spec,
            template,
            LabelSource::Records(records(5)),
            &GenerateRequest::default(),
        )
        .unwrap();
        assert_eq!(stats.first_page_capacity, 2);
        assert_eq!(stats.page_capacity, 30);
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.labels_on_last_page, 3);
        assert_eq!(stats.blank_cells_on_last_page, 27);
    }

    #[tokio::test]
    async fn test_load_source_requires_inputs() {
        let file_spec = spec("address-2.63x1");
        assert!(matches!(
            load_source(&file_spec, &GenerateRequest::default()).await,
            Err(LabelError::Config(_))
        ));

        let text_spec = LabelSpec {
            preset_type: PresetType::Text,
            text_mode: TextMode::Incremental,
            date_format: DateFormat::LeaveAsIs,
            ..spec("address-2.63x1")
        };
        let request = GenerateRequest {
            text: Some("A1".to_string()),
            ..GenerateRequest::default()
        };
        assert_eq!(
            load_source(&text_spec, &request).await.unwrap(),
            LabelSource::Incremental("A1".to_string())
        );
    }
}
