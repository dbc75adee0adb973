//! Parsing of the raw utility value: `"<cols>"`, `"<cols>,<borderWidthPx>"` or `"none"`.

use std::fmt;

pub const NONE_VALUE: &str = "none";
pub const VALUE_SEPARATOR: char = ',';

/// Number of equal-width column tracks. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnCount(u32);

impl ColumnCount {
    pub const MIN: ColumnCount = ColumnCount(1);

    pub fn new(cols: u32) -> Option<Self> {
        if cols == 0 { None } else { Some(Self(cols)) }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Lenient parse: anything that does not start with a positive integer is
    /// one column. Counts past `u32::MAX` clamp to it.
    pub fn parse(raw: &str) -> Self {
        match parse_leading_int(raw) {
            Some(n) if n > 0 => Self(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => Self::MIN,
        }
    }
}

impl Default for ColumnCount {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for ColumnCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An explicit border width, normalized to an even number of pixels so each
/// side of a cell can carry exactly half of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderWidth(u64);

impl BorderWidth {
    /// Returns `None` for zero, which means "keep the default width".
    pub fn from_px(px: i64) -> Option<Self> {
        if px == 0 {
            return None;
        }
        // round(px / 2) with halves going up, then doubled
        let half = px.saturating_add(1).div_euclid(2);
        Some(Self(half.saturating_mul(2).unsigned_abs()))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_leading_int(raw).and_then(Self::from_px)
    }

    pub fn px(self) -> u64 {
        self.0
    }

    pub fn to_css(self) -> String {
        format!("{}px", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridValue {
    None,
    Grid {
        cols: ColumnCount,
        border: Option<BorderWidth>,
    },
}

impl GridValue {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == NONE_VALUE {
            return GridValue::None;
        }
        let mut tokens = raw.split(VALUE_SEPARATOR);
        let cols = ColumnCount::parse(tokens.next().unwrap_or_default());
        let border = tokens.next().and_then(BorderWidth::parse);
        GridValue::Grid { cols, border }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, GridValue::None)
    }
}

/// Reads an optionally signed integer prefix, skipping leading whitespace and
/// ignoring whatever follows the digits (`"3px"` is 3, `"2.5"` is 2).
/// Magnitudes beyond `i64` saturate.
pub(crate) fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Column values 1 through 12 plus `none`, keyed the way utility classes are named.
pub fn default_values() -> Vec<(String, String)> {
    (1..=12)
        .map(|n| (n.to_string(), n.to_string()))
        .chain(std::iter::once((
            NONE_VALUE.to_string(),
            NONE_VALUE.to_string(),
        )))
        .collect()
}
