//! Full-featured workbook reader backed by calamine.
//!
//! Handles every format calamine detects from the extension (xlsx, xlsm,
//! xlsb, xls, ods). Date-formatted cells are reported as their serial
//! number so the grid matches the low-level xlsx reader.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use product_index_core::CellValue;

use crate::error::SheetError;
use crate::{Grid, SheetReader, normalize_grid};

/// Workbook reader using calamine's format auto-detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookReader;

impl WorkbookReader {
    pub fn new() -> Self {
        Self
    }
}

impl SheetReader for WorkbookReader {
    fn name(&self) -> &'static str {
        "calamine"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xlsm", "xlsb", "xls", "ods"]
    }

    fn read_first_sheet(&self, path: &Path) -> Result<Grid, SheetError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SheetError::missing_part("workbook has no worksheets"))??;

        // Ranges start at the first used cell; pad so coordinates match the sheet.
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let mut grid: Grid = vec![Vec::new(); first_row as usize];
        for row in range.rows() {
            let mut cells: Vec<Option<CellValue>> = vec![None; first_col as usize];
            cells.extend(row.iter().map(convert_cell));
            grid.push(cells);
        }

        Ok(normalize_grid(grid))
    }
}

fn convert_cell(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Int(i) => Some(CellValue::Int(*i)),
        Data::Float(f) => Some(CellValue::from_number(*f)),
        Data::String(s) => CellValue::from_text(s),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::from_number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(_) | Data::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Float(150.0)), Some(CellValue::Int(150)));
        assert_eq!(convert_cell(&Data::Float(12.5)), Some(CellValue::Float(12.5)));
        assert_eq!(
            convert_cell(&Data::String("  Ring ".to_string())),
            Some(CellValue::Text("Ring".to_string()))
        );
        assert_eq!(convert_cell(&Data::String("   ".to_string())), None);
        assert_eq!(convert_cell(&Data::Empty), None);
        assert_eq!(convert_cell(&Data::Bool(false)), Some(CellValue::Bool(false)));
    }
}
