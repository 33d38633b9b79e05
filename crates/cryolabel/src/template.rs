//! Label sheet templates
//!
//! A template describes the physical sheet: the table that backs it, which of
//! its cells carry labels, and enough measurements to place text on paper.

use crate::geometry::{Arrangement, SheetGeometry};
use crate::types::{LabelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// US Letter, the paper every built-in sheet is printed on
const LETTER_MM: (f32, f32) = (215.9, 279.4);

/// Physical description of a label sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTemplate {
    pub key: String,
    pub display_name: String,

    // Backing table, spacer rows/columns included
    pub table_rows: usize,
    pub table_cols: usize,
    #[serde(alias = "table_format")]
    pub arrangement: Arrangement,

    // Paper
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_left_mm: f32,

    // Cells
    pub label_width_mm: f32,
    pub label_height_mm: f32,
    #[serde(default)]
    pub spacer_width_mm: f32,
    #[serde(default)]
    pub spacer_height_mm: f32,

    // Hints for sizing the text entry box
    #[serde(default = "default_chars_per_line")]
    pub chars_per_line: usize,
    #[serde(default = "default_lines_per_label")]
    pub lines_per_label: usize,
}

fn default_chars_per_line() -> usize {
    20
}

fn default_lines_per_label() -> usize {
    3
}

/// A cell's rectangle on the page, measured from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x_mm: f32,
    pub top_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl LabelTemplate {
    pub fn geometry(&self) -> SheetGeometry {
        SheetGeometry::resolve(self.table_rows, self.table_cols, self.arrangement)
    }

    pub fn labels_per_sheet(&self) -> usize {
        let geometry = self.geometry();
        geometry.labels_down() * geometry.labels_across()
    }

    pub fn row_height_mm(&self, row: usize) -> f32 {
        if self.arrangement.keeps_row(row) {
            self.label_height_mm
        } else {
            self.spacer_height_mm
        }
    }

    pub fn col_width_mm(&self, col: usize) -> f32 {
        if self.arrangement.keeps_col(col) {
            self.label_width_mm
        } else {
            self.spacer_width_mm
        }
    }

    /// Rectangle of table cell `(row, col)`.
    pub fn cell_rect(&self, row: usize, col: usize) -> CellRect {
        let x_mm = self.margin_left_mm + (0..col).map(|c| self.col_width_mm(c)).sum::<f32>();
        let top_mm = self.margin_top_mm + (0..row).map(|r| self.row_height_mm(r)).sum::<f32>();
        CellRect {
            x_mm,
            top_mm,
            width_mm: self.col_width_mm(col),
            height_mm: self.row_height_mm(row),
        }
    }

    /// Whether `text` stays within the label's line and character hints.
    pub fn fits_text(&self, text: &str) -> bool {
        let mut lines = 0;
        for line in text.lines() {
            if line.chars().count() > self.chars_per_line {
                return false;
            }
            lines += 1;
        }
        lines <= self.lines_per_label
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(LabelError::Config("template key is empty".to_string()));
        }
        if self.table_rows == 0 || self.table_cols == 0 {
            return Err(LabelError::Config(format!(
                "template {:?} has an empty table",
                self.key
            )));
        }
        let sizes = [
            self.page_width_mm,
            self.page_height_mm,
            self.label_width_mm,
            self.label_height_mm,
        ];
        if sizes.iter().any(|&v| !v.is_finite() || v <= 0.0) {
            return Err(LabelError::Config(format!(
                "template {:?} needs positive page and label sizes",
                self.key
            )));
        }
        if self.spacer_width_mm < 0.0 || self.spacer_height_mm < 0.0 {
            return Err(LabelError::Config(format!(
                "template {:?} has negative spacing",
                self.key
            )));
        }

        let last = self.cell_rect(self.table_rows - 1, self.table_cols - 1);
        if last.x_mm + last.width_mm > self.page_width_mm + 0.5
            || last.top_mm + last.height_mm > self.page_height_mm + 0.5
        {
            log::warn!(
                "Template {:?} runs past the edge of its {}x{}mm page",
                self.key,
                self.page_width_mm,
                self.page_height_mm
            );
        }
        Ok(())
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Templates available to presets, keyed by `LabelTemplate::key`
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, LabelTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in sheets.
    pub fn builtin() -> Self {
        let templates = builtin_templates()
            .into_iter()
            .map(|t| (t.key.clone(), t))
            .collect();
        Self { templates }
    }

    pub fn insert(&mut self, template: LabelTemplate) -> Result<()> {
        template.validate()?;
        if self.templates.contains_key(&template.key) {
            log::info!("Replacing label template {:?}", template.key);
        }
        self.templates.insert(template.key.clone(), template);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&LabelTemplate> {
        self.templates
            .get(key)
            .ok_or_else(|| LabelError::UnknownTemplate(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Add every template from a JSON array. Returns how many were added.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let templates: Vec<LabelTemplate> = serde_json::from_str(json)?;
        let count = templates.len();
        for template in templates {
            self.insert(template)?;
        }
        Ok(count)
    }

    /// Load additional templates from a JSON file
    pub async fn load_json(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let json = tokio::fs::read_to_string(path).await?;
        self.extend_from_json(&json)
    }
}

fn builtin_templates() -> Vec<LabelTemplate> {
    let (page_width_mm, page_height_mm) = LETTER_MM;
    vec![
        LabelTemplate {
            key: "cryo-1.28x0.5".to_string(),
            display_name: "Cryo 1.28\" x 0.5\" (84 per sheet)".to_string(),
            table_rows: 27,
            table_cols: 11,
            arrangement: Arrangement::Checkerboard,
            page_width_mm,
            page_height_mm,
            margin_top_mm: 9.5,
            margin_left_mm: 2.45,
            label_width_mm: 32.5,
            label_height_mm: 12.7,
            spacer_width_mm: 3.2,
            spacer_height_mm: 6.35,
            chars_per_line: 16,
            lines_per_label: 3,
        },
        LabelTemplate {
            key: "cryo-1.05x0.5".to_string(),
            display_name: "Cryo 1.05\" x 0.5\" striped (140 per sheet)".to_string(),
            table_rows: 20,
            table_cols: 13,
            arrangement: Arrangement::Striped,
            page_width_mm,
            page_height_mm,
            margin_top_mm: 12.7,
            margin_left_mm: 6.9,
            label_width_mm: 26.7,
            label_height_mm: 12.7,
            spacer_width_mm: 2.54,
            spacer_height_mm: 0.0,
            chars_per_line: 13,
            lines_per_label: 3,
        },
        LabelTemplate {
            key: "address-2.63x1".to_string(),
            display_name: "Address 2.63\" x 1\" (30 per sheet)".to_string(),
            table_rows: 10,
            table_cols: 3,
            arrangement: Arrangement::FullGrid,
            page_width_mm,
            page_height_mm,
            margin_top_mm: 12.7,
            margin_left_mm: 7.9,
            label_width_mm: 66.7,
            label_height_mm: 25.4,
            spacer_width_mm: 0.0,
            spacer_height_mm: 0.0,
            chars_per_line: 30,
            lines_per_label: 4,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_are_valid() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.len(), 3);
        for template in registry.iter() {
            template.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_capacities() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.get("cryo-1.28x0.5").unwrap().labels_per_sheet(), 84);
        assert_eq!(registry.get("cryo-1.05x0.5").unwrap().labels_per_sheet(), 140);
        assert_eq!(registry.get("address-2.63x1").unwrap().labels_per_sheet(), 30);
    }

    #[test]
    fn test_unknown_template() {
        let registry = TemplateRegistry::builtin();
        assert!(matches!(
            registry.get("nope"),
            Err(LabelError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_cell_rect_skips_spacers() {
        let registry = TemplateRegistry::builtin();
        let t = registry.get("cryo-1.28x0.5").unwrap();
        let rect = t.cell_rect(2, 2);
        assert!((rect.x_mm - (2.45 + 32.5 + 3.2)).abs() < 1e-4);
        assert!((rect.top_mm - (9.5 + 12.7 + 6.35)).abs() < 1e-4);
        assert_eq!(rect.width_mm, 32.5);
        assert_eq!(t.cell_rect(1, 1).width_mm, 3.2);
    }

    #[test]
    fn test_fits_text_uses_hints() {
        let registry = TemplateRegistry::builtin();
        let t = registry.get("cryo-1.28x0.5").unwrap();
        assert!(t.fits_text("S-001\nliver\n2024-03-01"));
        assert!(!t.fits_text("a\nb\nc\nd"));
        assert!(!t.fits_text(&"x".repeat(t.chars_per_line + 1)));
        assert!(t.fits_text(""));
    }

    #[test]
    fn test_extend_from_json() {
        let json = r#"[{
            "key": "tiny",
            "display_name": "Tiny",
            "table_rows": 3,
            "table_cols": 3,
            "table_format": "checkerboard",
            "page_width_mm": 100.0,
            "page_height_mm": 100.0,
            "margin_top_mm": 5.0,
            "margin_left_mm": 5.0,
            "label_width_mm": 20.0,
            "label_height_mm": 10.0,
            "spacer_width_mm": 2.0
        }]"#;
        let mut registry = TemplateRegistry::empty();
        assert_eq!(registry.extend_from_json(json).unwrap(), 1);
        let t = registry.get("tiny").unwrap();
        assert_eq!(t.arrangement, Arrangement::Checkerboard);
        assert_eq!(t.labels_per_sheet(), 4);
        assert_eq!(t.chars_per_line, 20);
    }

    #[test]
    fn test_json_with_unknown_arrangement_rejected() {
        let json = r#"[{
            "key": "bad", "display_name": "Bad", "table_rows": 1, "table_cols": 1,
            "arrangement": "hexagonal", "page_width_mm": 10.0, "page_height_mm": 10.0,
            "margin_top_mm": 0.0, "margin_left_mm": 0.0,
            "label_width_mm": 5.0, "label_height_mm": 5.0
        }]"#;
        let mut registry = TemplateRegistry::empty();
        let err = registry.extend_from_json(json).unwrap_err();
        assert!(err.to_string().contains("hexagonal"));
    }
}
