//! Incrementing serial numbers for text presets
//!
//! A seed such as `AB-0007` splits into a prefix (`AB-`) and a trailing
//! digit run (`0007`). Serials count up from that number and keep the
//! original zero-padding width; numbers that outgrow it print wider.

use crate::types::{LabelError, Result};
use regex::Regex;
use std::sync::LazyLock;

static SEED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9\-_]*?)(\d+)$").expect("seed pattern is valid"));

static SERIAL_FORMATS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"^\d{1,12}$",
        r"^[A-Za-z0-9]{1,5}-\d{1,10}$",
        r"^[A-Za-z0-9]{1,5}_\d{1,10}$",
        r"^[A-Za-z0-9]{1,5}\d{1,10}$",
    ]
    .map(|pattern| Regex::new(pattern).expect("serial pattern is valid"))
});

/// Longest starting serial accepted from the text box
pub const MAX_SERIAL_LEN: usize = 12;

/// Parsed starting serial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSeed {
    pub prefix: String,
    pub start: u64,
    pub width: usize,
}

impl SerialSeed {
    /// Format serial number `n` with this seed's prefix and padding.
    pub fn format(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }

    /// Endless run of serials starting at the seed.
    pub fn serials(&self) -> impl Iterator<Item = String> + '_ {
        (self.start..).map(|n| self.format(n))
    }

    /// The first `count` serials.
    pub fn generate(&self, count: usize) -> Vec<String> {
        self.serials().take(count).collect()
    }
}

/// Split `text` into prefix, starting number and digit width.
pub fn parse_seed(text: &str) -> Result<SerialSeed> {
    let text = text.trim();
    let caps = SEED_RE
        .captures(text)
        .ok_or_else(|| LabelError::InvalidSerial(text.to_string()))?;

    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let digits = caps.get(2).map_or("", |m| m.as_str());
    let start = digits
        .parse()
        .map_err(|_| LabelError::InvalidSerial(text.to_string()))?;

    Ok(SerialSeed {
        prefix: prefix.to_string(),
        start,
        width: digits.len(),
    })
}

/// Whether `text` is one of the accepted starting-serial shapes:
/// digits only, or a 1-5 character alphanumeric prefix followed by digits,
/// optionally separated by `-` or `_`.
pub fn is_valid_serial_format(text: &str) -> bool {
    text.len() <= MAX_SERIAL_LEN && SERIAL_FORMATS.iter().any(|re| re.is_match(text))
}
