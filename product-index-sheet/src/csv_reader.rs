//! CSV export of the product sheet.
//!
//! CSV carries no cell types, so a field counts as numeric when it looks
//! like a plain decimal number ("150", "12.0", "-3.5", "1e3").

use std::path::Path;

use product_index_core::CellValue;

use crate::error::SheetError;
use crate::{Grid, SheetReader, normalize_grid};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReader;

impl CsvReader {
    pub fn new() -> Self {
        Self
    }
}

impl SheetReader for CsvReader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn read_first_sheet(&self, path: &Path) -> Result<Grid, SheetError> {
        let contents = std::fs::read_to_string(path)?;
        parse_csv(&contents)
    }
}

/// Parse CSV text into a normalized grid. The header row is kept as row 0.
pub fn parse_csv(content: &str) -> Result<Grid, SheetError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Grid::new();
    for result in reader.records() {
        let record = result?;
        grid.push(record.iter().map(convert_field).collect());
    }

    Ok(normalize_grid(grid))
}

fn convert_field(field: &str) -> Option<CellValue> {
    let trimmed = field.trim();
    if looks_numeric(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            return Some(CellValue::from_number(n));
        }
    }
    CellValue::from_text(trimmed)
}

/// Digits with optional sign, decimal point and exponent. Rejects words
/// `f64::from_str` would accept, such as "inf" or "NaN".
fn looks_numeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}
