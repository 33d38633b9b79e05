//! Label presets
//!
//! A `LabelSpec` is loaded from a preset JSON file and is read-only afterwards.
//! Per-run choices (copies picked from the preset's list, a partial first
//! sheet) travel separately in a `GenerateRequest`.

use crate::format::DateFormat;
use crate::geometry::PartialRange;
use crate::template::{LabelTemplate, TemplateRegistry};
use crate::types::{CellStyle, LabelError, Result, TextAlignment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where label content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresetType {
    /// Records read from a CSV or spreadsheet file
    #[default]
    #[serde(alias = "file", alias = "FILE")]
    File,
    /// A single line typed by the user
    #[serde(alias = "text", alias = "TEXT")]
    Text,
}

/// How text presets turn their input into labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextMode {
    #[default]
    #[serde(alias = "identical")]
    Identical,
    #[serde(alias = "incremental")]
    Incremental,
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
        }
    }
}

// =============================================================================
// Copies per label
// =============================================================================

/// Largest count a copies range such as `"1-10"` may expand to
pub const MAX_COPIES_PER_LABEL: usize = 1000;

/// Copies printed per record, as configured in the preset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Copies {
    /// Blank field: identical text fills the first page
    #[default]
    Fill,
    /// Candidate counts, e.g. `"1,2,4-6"`; the first is used unless overridden
    Counts(Vec<usize>),
}

impl Copies {
    /// Parse a count list such as `"2"`, `"1,2,4-6"` or a blank string.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Copies::Fill);
        }

        let invalid = || LabelError::InvalidCopies(text.to_string());
        let mut counts = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo: usize = lo.trim().parse().map_err(|_| invalid())?;
                    let hi: usize = hi.trim().parse().map_err(|_| invalid())?;
                    if lo > hi || hi > MAX_COPIES_PER_LABEL {
                        return Err(invalid());
                    }
                    counts.extend(lo..=hi);
                }
                None => counts.push(part.parse().map_err(|_| invalid())?),
            }
        }

        if counts.is_empty() {
            Ok(Copies::Fill)
        } else {
            Ok(Copies::Counts(counts))
        }
    }

    pub fn candidates(&self) -> &[usize] {
        match self {
            Copies::Fill => &[],
            Copies::Counts(counts) => counts,
        }
    }

    /// The default count, or `None` for the fill-the-page convenience.
    pub fn first(&self) -> Option<usize> {
        self.candidates().first().copied()
    }
}

impl fmt::Display for Copies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.candidates().iter().map(usize::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

mod serde_impls {
    use super::*;
    use serde::de::{self, Visitor};

    impl Serialize for Copies {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            match self.candidates() {
                [single] => serializer.serialize_u64(*single as u64),
                _ => serializer.serialize_str(&self.to_string()),
            }
        }
    }

    impl<'de> Deserialize<'de> for Copies {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            struct CopiesVisitor;

            impl<'de> Visitor<'de> for CopiesVisitor {
                type Value = Copies;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a copy count, a list such as \"1,2,4-6\", or blank")
                }

                fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Copies, E> {
                    Ok(Copies::Counts(vec![value as usize]))
                }

                fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Copies, E> {
                    usize::try_from(value)
                        .map(|v| Copies::Counts(vec![v]))
                        .map_err(|_| E::custom(format!("negative copy count {value}")))
                }

                fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Copies, E> {
                    Copies::parse(value).map_err(E::custom)
                }

                fn visit_unit<E: de::Error>(self) -> std::result::Result<Copies, E> {
                    Ok(Copies::Fill)
                }

                fn visit_none<E: de::Error>(self) -> std::result::Result<Copies, E> {
                    Ok(Copies::Fill)
                }
            }

            deserializer.deserialize_any(CopiesVisitor)
        }
    }

    impl Serialize for OutputFormat {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(match self {
                OutputFormat::Pdf => "PDF",
            })
        }
    }

    impl<'de> Deserialize<'de> for OutputFormat {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            match s.trim().trim_start_matches('.').to_ascii_uppercase().as_str() {
                "PDF" | "" => Ok(OutputFormat::Pdf),
                other => Err(de::Error::custom(format!(
                    "Unsupported output format {other:?}; only PDF is written"
                ))),
            }
        }
    }

    /// Numbers that older presets stored as strings, e.g. `"5.5"`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    impl NumberOrText {
        fn into_f64<E: de::Error>(self) -> std::result::Result<f64, E> {
            match self {
                NumberOrText::Number(n) => Ok(n),
                NumberOrText::Text(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("expected a number, found {s:?}"))),
            }
        }
    }

    pub(super) fn flexible_f32<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        NumberOrText::deserialize(deserializer)?
            .into_f64()
            .map(|n| n as f32)
    }

    pub(super) fn flexible_usize<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = NumberOrText::deserialize(deserializer)?.into_f64::<D::Error>()?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(de::Error::custom(format!("expected a whole number, found {n}")));
        }
        Ok(n as usize)
    }
}

// =============================================================================
// Preset
// =============================================================================

/// A saved label preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSpec {
    #[serde(alias = "presetname")]
    pub name: String,
    #[serde(alias = "presettype")]
    pub preset_type: PresetType,
    #[serde(alias = "labeltemplate")]
    pub template: String,

    // Content
    #[serde(alias = "copiesperlabel")]
    pub copies: Copies,
    #[serde(alias = "identical_or_incremental")]
    pub text_mode: TextMode,
    #[serde(alias = "textboxformatinput")]
    pub format_template: String,
    pub date_format: DateFormat,
    pub remove_duplicates: bool,
    /// Sheets of serials printed by incremental text presets
    #[serde(alias = "pages_of_labels", deserialize_with = "serde_impls::flexible_usize")]
    pub pages: usize,

    // Styling
    #[serde(alias = "fontname")]
    pub font_name: String,
    #[serde(alias = "fontsize", deserialize_with = "serde_impls::flexible_f32")]
    pub font_size_pt: f32,
    pub bold: bool,
    #[serde(alias = "text_alignment")]
    pub alignment: TextAlignment,

    // Partial first sheet
    #[serde(alias = "partialsheet")]
    pub partial_sheet: bool,
    #[serde(flatten)]
    pub partial_range: Option<PartialRange>,

    // Output
    #[serde(alias = "outputfilenameprefix")]
    pub output_prefix: String,
    pub output_add_date: bool,
    #[serde(alias = "outputformat")]
    pub output_format: OutputFormat,
}

impl Default for LabelSpec {
    fn default() -> Self {
        let style = CellStyle::default();
        Self {
            name: String::new(),
            preset_type: PresetType::File,
            template: String::new(),
            copies: Copies::Counts(vec![1]),
            text_mode: TextMode::Identical,
            format_template: String::new(),
            date_format: DateFormat::LeaveAsIs,
            remove_duplicates: false,
            pages: 1,
            font_name: style.font_name,
            font_size_pt: style.font_size_pt,
            bold: style.bold,
            alignment: style.alignment,
            partial_sheet: false,
            partial_range: None,
            output_prefix: "labels".to_string(),
            output_add_date: true,
            output_format: OutputFormat::Pdf,
        }
    }
}

impl LabelSpec {
    /// Load a preset from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let spec = serde_json::from_slice(&bytes)
            .map_err(|e| LabelError::Config(format!("Failed to parse preset: {}", e)))?;
        Ok(spec)
    }

    /// Save a preset to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn cell_style(&self) -> CellStyle {
        CellStyle {
            font_name: self.font_name.clone(),
            font_size_pt: self.font_size_pt,
            bold: self.bold,
            alignment: self.alignment,
        }
    }

    /// The configured partial range, if partial sheets are switched on.
    pub fn partial_range(&self) -> Option<&PartialRange> {
        if self.partial_sheet {
            self.partial_range.as_ref()
        } else {
            None
        }
    }

    /// Reject anything that would fail part-way through a run.
    pub fn validate(&self, registry: &TemplateRegistry) -> Result<()> {
        let template = registry.get(&self.template)?;
        template.validate()?;

        if self.copies.candidates().contains(&0) {
            return Err(LabelError::InvalidCopies(
                "copy counts must be at least 1".to_string(),
            ));
        }
        if self.pages == 0 {
            return Err(LabelError::Config(
                "pages of labels must be at least 1".to_string(),
            ));
        }
        if !self.font_size_pt.is_finite() || self.font_size_pt <= 0.0 {
            return Err(LabelError::Config(format!(
                "font size {} must be positive",
                self.font_size_pt
            )));
        }
        if !self.date_format.is_valid() {
            return Err(LabelError::Config(format!(
                "date format {:?} is not a valid strftime pattern",
                self.date_format.pattern().unwrap_or_default()
            )));
        }
        if self.partial_sheet {
            let range = self.partial_range.ok_or_else(|| {
                LabelError::InvalidPartialRange(
                    "partial sheet is on but no range is set".to_string(),
                )
            })?;
            range.validate(&template.geometry())?;
        }
        if self.preset_type == PresetType::File && self.format_template.trim().is_empty() {
            log::warn!("Preset {:?} has no format template; labels will be blank", self.name);
        }
        Ok(())
    }
}

// =============================================================================
// Per-run request
// =============================================================================

/// Inputs and overrides for one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Data file for file presets
    pub input_path: Option<PathBuf>,
    /// Literal text or starting serial for text presets
    pub text: Option<String>,
    /// Output file, or a directory to place a generated file name in
    pub output_path: Option<PathBuf>,
    /// Copies per label, replacing the preset's default
    pub copies: Option<usize>,
    /// Partial first sheet, replacing the preset's range
    pub partial_range: Option<PartialRange>,
}

impl GenerateRequest {
    /// Copies to print: the override, else the preset's first candidate.
    pub fn copies(&self, spec: &LabelSpec) -> Option<usize> {
        self.copies.or_else(|| spec.copies.first())
    }

    pub fn partial_range(&self, spec: &LabelSpec) -> Option<PartialRange> {
        self.partial_range.or_else(|| spec.partial_range().copied())
    }
}

/// Look up and check the template a preset refers to.
pub fn resolve_template<'r>(
    spec: &LabelSpec,
    registry: &'r TemplateRegistry,
) -> Result<&'r LabelTemplate> {
    spec.validate(registry)?;
    registry.get(&spec.template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_parse() {
        assert_eq!(Copies::parse("").unwrap(), Copies::Fill);
        assert_eq!(Copies::parse(" 3 ").unwrap(), Copies::Counts(vec![3]));
        assert_eq!(
            Copies::parse("1,2,4-6").unwrap(),
            Copies::Counts(vec![1, 2, 4, 5, 6])
        );
        assert!(Copies::parse("6-4").is_err());
        assert!(Copies::parse("two").is_err());
        assert!(matches!(
            Copies::parse("1-4000000000"),
            Err(LabelError::InvalidCopies(_))
        ));
        assert_eq!(Copies::parse("999-1000").unwrap().candidates().len(), 2);
        assert_eq!(Copies::parse("1,2,4-6").unwrap().to_string(), "1,2,4,5,6");
    }

    #[test]
    fn test_historical_preset_keys() {
        let json = r#"{
            "presetname": "Tubes",
            "presettype": "Text",
            "labeltemplate": "cryo-1.28x0.5",
            "copiesperlabel": "2,4",
            "identical_or_incremental": "Incremental",
            "fontname": "Arial",
            "fontsize": "5.5",
            "text_alignment": "Left",
            "date_format": "Leave as is",
            "partialsheet": true,
            "row_start": 2, "row_end": 5, "col_start": 3, "col_end": 1,
            "pages_of_labels": "2",
            "outputfilenameprefix": "tubes",
            "output_add_date": false,
            "outputformat": "PDF"
        }"#;
        let spec: LabelSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.preset_type, PresetType::Text);
        assert_eq!(spec.text_mode, TextMode::Incremental);
        assert_eq!(spec.copies, Copies::Counts(vec![2, 4]));
        assert_eq!(spec.font_size_pt, 5.5);
        assert_eq!(spec.alignment, TextAlignment::Left);
        assert_eq!(spec.pages, 2);
        assert_eq!(spec.partial_range(), Some(&PartialRange::new(2, 3, 5, 1)));
        assert_eq!(spec.output_prefix, "tubes");
        assert!(spec.bold);
        spec.validate(&TemplateRegistry::builtin()).unwrap();
    }

    #[test]
    fn test_blank_copies_and_missing_range() {
        let json = r#"{"labeltemplate": "address-2.63x1", "copiesperlabel": ""}"#;
        let spec: LabelSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.copies, Copies::Fill);
        assert_eq!(spec.partial_range, None);
        assert_eq!(spec.pages, 1);
    }

    #[test]
    fn test_docx_output_rejected() {
        let json = r#"{"labeltemplate": "address-2.63x1", "outputformat": "DOCX"}"#;
        let err = serde_json::from_str::<LabelSpec>(json).unwrap_err();
        assert!(err.to_string().contains("DOCX"));
    }

    #[test]
    fn test_validate_rejects_bad_presets() {
        let registry = TemplateRegistry::builtin();
        let base = LabelSpec {
            template: "cryo-1.28x0.5".to_string(),
            ..LabelSpec::default()
        };
        base.validate(&registry).unwrap();

        let unknown = LabelSpec {
            template: "nope".to_string(),
            ..base.clone()
        };
        assert!(matches!(
            unknown.validate(&registry),
            Err(LabelError::UnknownTemplate(_))
        ));

        let zero = LabelSpec {
            copies: Copies::Counts(vec![0]),
            ..base.clone()
        };
        assert!(matches!(zero.validate(&registry), Err(LabelError::InvalidCopies(_))));

        let no_pages = LabelSpec { pages: 0, ..base.clone() };
        assert!(no_pages.validate(&registry).is_err());

        let bad_date = LabelSpec {
            date_format: DateFormat::from("%Q"),
            ..base.clone()
        };
        assert!(bad_date.validate(&registry).is_err());

        let off_sheet = LabelSpec {
            partial_sheet: true,
            partial_range: Some(PartialRange::new(1, 1, 99, 1)),
            ..base.clone()
        };
        assert!(matches!(
            off_sheet.validate(&registry),
            Err(LabelError::InvalidPartialRange(_))
        ));

        let missing_range = LabelSpec {
            partial_sheet: true,
            ..base
        };
        assert!(missing_range.validate(&registry).is_err());
    }

    #[test]
    fn test_request_overrides() {
        let spec = LabelSpec {
            copies: Copies::Counts(vec![2, 3]),
            partial_sheet: false,
            partial_range: Some(PartialRange::new(2, 1, 3, 1)),
            ..LabelSpec::default()
        };
        let request = GenerateRequest::default();
        assert_eq!(request.copies(&spec), Some(2));
        assert_eq!(request.partial_range(&spec), None);

        let request = GenerateRequest {
            copies: Some(3),
            partial_range: Some(PartialRange::new(1, 2, 1, 3)),
            ..GenerateRequest::default()
        };
        assert_eq!(request.copies(&spec), Some(3));
        assert_eq!(request.partial_range(&spec), Some(PartialRange::new(1, 2, 1, 3)));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        let spec = LabelSpec {
            name: "Plasma".to_string(),
            template: "cryo-1.05x0.5".to_string(),
            copies: Copies::Counts(vec![1, 2]),
            format_template: "{ID}\n{Date}".to_string(),
            date_format: DateFormat::from("%m-%d-%Y"),
            ..LabelSpec::default()
        };
        spec.save(&path).await.unwrap();
        let loaded = LabelSpec::load(&path).await.unwrap();
        assert_eq!(loaded, spec);
    }
}
