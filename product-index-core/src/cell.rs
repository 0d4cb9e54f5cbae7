use serde::{Deserialize, Serialize};

/// Largest magnitude at which every whole `f64` is exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single non-empty spreadsheet value.
///
/// Empty cells are never represented here; callers use `Option<CellValue>`
/// and treat `None` as "no value". Serializes untagged, so an `Int` becomes a
/// JSON number and a `Text` a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Build a numeric value, collapsing whole floats (`12.0`) to integers.
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    /// Build a text value from raw cell text.
    ///
    /// The text is trimmed; returns `None` when nothing is left.
    pub fn from_text(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::Text(trimmed.to_string()))
        }
    }

    /// Render the value the way it is used inside lookup keys.
    ///
    /// Whole numbers render without a fractional part; text is trimmed.
    pub fn key_string(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }

    /// Interpret a numeric value as an integer if it is whole.
    ///
    /// Text is never converted, so an ID like `"007"` keeps its zeros.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => Some(*f as i64),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
