use crate::document::{Cell, SheetDocument};
use crate::template::LabelTemplate;
use crate::types::{LabelError, Result, TextAlignment};
use printpdf::*;

/// Points per millimeter (1 inch = 72 points = 25.4mm)
const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Line advance as a multiple of the font size
const LINE_SPACING: f32 = 1.15;

/// Distance from a line's top to its baseline as a fraction of font size
const ASCENT_RATIO: f32 = 0.75;

/// Inset used for left/right aligned text
const CELL_PADDING_MM: f32 = 0.8;

// Approximate average glyph widths (fraction of font size) for bold faces
const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.58;
const TIMES_CHAR_WIDTH_RATIO: f32 = 0.5;
const COURIER_CHAR_WIDTH_RATIO: f32 = 0.6;

/// Map a preset font name onto one of the PDF base fonts.
pub fn builtin_font(name: &str, bold: bool) -> BuiltinFont {
    let name = name.to_ascii_lowercase();
    if name.contains("courier") || name.contains("mono") {
        if bold {
            BuiltinFont::CourierBold
        } else {
            BuiltinFont::Courier
        }
    } else if name.contains("times") || name.contains("serif") && !name.contains("sans") {
        if bold {
            BuiltinFont::TimesBold
        } else {
            BuiltinFont::TimesRoman
        }
    } else if bold {
        BuiltinFont::HelveticaBold
    } else {
        BuiltinFont::Helvetica
    }
}

fn char_width_ratio(font: &BuiltinFont) -> f32 {
    match font {
        BuiltinFont::Courier | BuiltinFont::CourierBold => COURIER_CHAR_WIDTH_RATIO,
        BuiltinFont::TimesRoman | BuiltinFont::TimesBold => TIMES_CHAR_WIDTH_RATIO,
        _ => HELVETICA_CHAR_WIDTH_RATIO,
    }
}

/// Estimated printed width of `text` in millimeters.
fn text_width_mm(text: &str, font: &BuiltinFont, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * char_width_ratio(font) / POINTS_PER_MM
}

/// Serialize `doc` as a PDF, one PDF page per page-break-separated section.
pub fn render_pdf_bytes(
    doc: &SheetDocument,
    template: &LabelTemplate,
    title: &str,
) -> Result<Vec<u8>> {
    if doc.tables().next().is_none() {
        return Err(LabelError::Pdf("document has no label tables".to_string()));
    }

    let mut pdf = PdfDocument::new(title);
    let mut pages = Vec::new();

    for tables in doc.pages() {
        let mut ops = Vec::new();
        for table in tables {
            for (row, col, cell) in table.filled_cells() {
                push_cell_ops(&mut ops, template, row, col, cell);
            }
        }
        pages.push(PdfPage::new(
            Mm(template.page_width_mm),
            Mm(template.page_height_mm),
            ops,
        ));
    }

    log::debug!("Writing {} PDF pages", pages.len());
    pdf.pages = pages;

    let mut warnings = Vec::new();
    let bytes = pdf.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("PDF writer reported {} warnings", warnings.len());
    }

    Ok(bytes)
}

fn push_cell_ops(ops: &mut Vec<Op>, template: &LabelTemplate, row: usize, col: usize, cell: &Cell) {
    let style = cell.style.clone().unwrap_or_default();
    let rect = template.cell_rect(row, col);
    let font = builtin_font(&style.font_name, style.bold);
    let size_pt = style.font_size_pt;

    let line_height_mm = size_pt * LINE_SPACING / POINTS_PER_MM;
    let lines: Vec<&str> = cell.text.lines().collect();
    let block_height_mm = line_height_mm * lines.len() as f32;
    let block_top_mm = rect.top_mm + (rect.height_mm - block_height_mm) / 2.0;

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }

        let baseline_from_top_mm =
            block_top_mm + line_height_mm * i as f32 + size_pt * ASCENT_RATIO / POINTS_PER_MM;
        let y_mm = template.page_height_mm - baseline_from_top_mm;

        let width_mm = text_width_mm(line, &font, size_pt);
        let x_mm = match style.alignment {
            TextAlignment::Left => rect.x_mm + CELL_PADDING_MM,
            TextAlignment::Center => rect.x_mm + (rect.width_mm - width_mm) / 2.0,
            TextAlignment::Right => rect.x_mm + rect.width_mm - width_mm - CELL_PADDING_MM,
        };

        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Mm(x_mm).into_pt(),
                y: Mm(y_mm).into_pt(),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            font: font.clone(),
            size: Pt(size_pt),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.to_string())],
            font: font.clone(),
        });
        ops.push(Op::EndTextSection);
    }
}
