//! Label text substitution
//!
//! Format templates look like `"{ID}\n{Last}, {First}\n{Date}"`. Every `{...}`
//! token consumes the next value of the record **by position**; the name inside
//! the braces is only documentation. A token may carry a Python-style slice
//! suffix, e.g. `{ID}[2:5]` or `{ID}[-4:]`.
//!
//! Missing values, nulls and malformed slices never fail: they become empty
//! strings or pass through unsliced.

use crate::types::CellValue;
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Sentinel stored in presets to keep dates in their default form
pub const LEAVE_AS_IS: &str = "Leave as is";

/// A `{name}` token with an optional `[a:b]` slice suffix
pub(crate) static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}]*)\}(?:\[([^\[\]]*)\])?").expect("token pattern is valid")
});

/// How date values are written on labels
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum DateFormat {
    #[default]
    LeaveAsIs,
    /// A strftime-style pattern such as `%m-%d-%Y`
    Pattern(String),
}

impl DateFormat {
    pub fn pattern(&self) -> Option<&str> {
        match self {
            DateFormat::LeaveAsIs => None,
            DateFormat::Pattern(p) => Some(p),
        }
    }

    /// Whether the pattern only contains valid strftime specifiers.
    pub fn is_valid(&self) -> bool {
        match self {
            DateFormat::LeaveAsIs => true,
            DateFormat::Pattern(p) => strftime_is_valid(p),
        }
    }
}

impl From<Option<String>> for DateFormat {
    fn from(value: Option<String>) -> Self {
        match value {
            None => DateFormat::LeaveAsIs,
            Some(s) if s.trim().is_empty() || s == LEAVE_AS_IS => DateFormat::LeaveAsIs,
            Some(s) => DateFormat::Pattern(s),
        }
    }
}

impl From<&str> for DateFormat {
    fn from(value: &str) -> Self {
        DateFormat::from(Some(value.to_string()))
    }
}

impl From<DateFormat> for String {
    fn from(value: DateFormat) -> Self {
        match value {
            DateFormat::LeaveAsIs => LEAVE_AS_IS.to_string(),
            DateFormat::Pattern(p) => p,
        }
    }
}

fn strftime_is_valid(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Expand `template` against `record`.
pub fn apply_format(template: &str, record: &[CellValue], date_format: &DateFormat) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for (position, caps) in TOKEN_RE.captures_iter(template).enumerate() {
        let Some(token) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..token.start()]);
        last = token.end();

        let Some(value) = record.get(position) else {
            continue;
        };

        let slice = caps.get(2).map(|m| m.as_str());
        out.push_str(&render_value(value, slice, date_format));
    }

    out.push_str(&template[last..]);
    out
}

fn render_value(value: &CellValue, slice: Option<&str>, date_format: &DateFormat) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Date(d) => match date_format.pattern() {
            Some(p) if strftime_is_valid(p) => d.format(p).to_string(),
            Some(p) => {
                log::warn!("Ignoring invalid date format {p:?}");
                d.to_string()
            }
            None => d.to_string(),
        },
        CellValue::DateTime(dt) => match date_format.pattern() {
            Some(p) if strftime_is_valid(p) => dt.format(p).to_string(),
            Some(p) => {
                log::warn!("Ignoring invalid date format {p:?}");
                dt.to_string()
            }
            None => dt.to_string(),
        },
        CellValue::Text(text) => match slice {
            None => text.clone(),
            Some(expr) => match parse_slice(expr) {
                Some((start, end)) => python_slice(text, start, end),
                None => {
                    log::warn!("Ignoring malformed slice [{expr}] applied to {text:?}");
                    text.clone()
                }
            },
        },
    }
}

/// Parse `start:end` where either bound may be omitted or negative.
fn parse_slice(expr: &str) -> Option<(Option<i64>, Option<i64>)> {
    let (start, end) = expr.split_once(':')?;
    let bound = |s: &str| -> Option<Option<i64>> {
        let s = s.trim();
        if s.is_empty() {
            Some(None)
        } else {
            s.parse().ok().map(Some)
        }
    };
    Some((bound(start)?, bound(end)?))
}

/// Character slice with Python semantics: negative bounds count from the
/// end and out-of-range bounds clamp.
fn python_slice(text: &str, start: Option<i64>, end: Option<i64>) -> String {
    let len = text.chars().count() as i64;
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { i + len } else { i };
        i.clamp(0, len) as usize
    };
    let start = start.map_or(0, clamp);
    let end = end.map_or(len as usize, clamp);
    if start >= end {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}
