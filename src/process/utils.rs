use regex::Regex;
use tracing::warn;

/// Optionally signed number with an optional fractional part.
/// The sign is kept on purpose: downstream power levels go negative, and a
/// sign-less `\d+\.\d+` would report -1.2 dBmV as 1.2 and "603 MHz" as 0.
pub const DECIMAL_PATTERN: &str = r"-?\d+(?:\.\d+)?";
/// Unsigned run of digits.
pub const INTEGER_PATTERN: &str = r"\d+";

/// Trim surrounding whitespace (including the `&nbsp;` html5ever decodes to U+00A0).
pub fn clean_str(raw: &str) -> String {
    raw.trim().to_string()
}

/// Unit conversion applied after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Identity,
    /// Source value is in mega-units (MHz), output in base units (Hz).
    MegaToUnit,
}

impl Scale {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Scale::Identity => v,
            Scale::MegaToUnit => v * 1_000_000.0,
        }
    }
}

/// First substring of `raw` matching `pattern`, parsed as `f64`.
/// `None` when there is no match or the match is not a number.
pub fn extract_number(pattern: &Regex, raw: &str) -> Option<f64> {
    pattern.find(raw)?.as_str().parse::<f64>().ok()
}

/// Like [`extract_number`] but degrades to `0.0`, logging the miss.
pub fn extract_or_zero(pattern: &Regex, raw: &str) -> f64 {
    extract_number(pattern, raw).unwrap_or_else(|| {
        warn!(raw, pattern = pattern.as_str(), "no numeric value in cell, using 0");
        0.0
    })
}
