//! Spreadsheet readers for the product metadata sheet.
//!
//! Every reader turns the first worksheet of a file into the same [`Grid`]:
//! row-major, header row first, empty cells as `None`, text trimmed, whole
//! numbers as integers. Callers pick readers with [`available_readers`] and
//! load through [`read_sheet`], which falls through to the next reader when
//! one fails.

pub mod csv_reader;
pub mod error;
pub mod xlsx;

#[cfg(feature = "calamine")]
pub mod workbook;

use std::path::Path;

use product_index_core::CellValue;

pub use csv_reader::CsvReader;
pub use error::SheetError;
pub use xlsx::XlsxReader;

#[cfg(feature = "calamine")]
pub use workbook::WorkbookReader;

/// Row-major cell matrix of one worksheet.
pub type Grid = Vec<Vec<Option<CellValue>>>;

/// A strategy for reading the first worksheet of a spreadsheet file.
///
/// Implementations must agree cell-for-cell on any file they can all read,
/// so the loader never needs to know which one produced a grid.
pub trait SheetReader {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// File extensions (lowercase, without dot) this reader handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Read the first worksheet into a normalized grid.
    fn read_first_sheet(&self, path: &Path) -> Result<Grid, SheetError>;

    /// Check whether this reader handles the file's extension (case-insensitive).
    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let lower = e.to_lowercase();
                self.extensions().iter().any(|x| *x == lower)
            })
            .unwrap_or(false)
    }
}

/// A grid together with the reader that produced it.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub reader: &'static str,
    pub grid: Grid,
}

/// All readers compiled into this build, most capable first.
pub fn available_readers() -> Vec<Box<dyn SheetReader>> {
    let mut readers: Vec<Box<dyn SheetReader>> = Vec::new();
    #[cfg(feature = "calamine")]
    readers.push(Box::new(WorkbookReader::new()));
    readers.extend(builtin_readers());
    readers
}

/// Readers with no optional dependencies: the low-level xlsx reader and CSV.
pub fn builtin_readers() -> Vec<Box<dyn SheetReader>> {
    vec![Box::new(XlsxReader::new()), Box::new(CsvReader::new())]
}

/// Read a spreadsheet with the first reader that succeeds.
///
/// Readers that do not handle the file's extension are skipped. A failing
/// reader is logged and the next one is tried; the last error is returned
/// when none succeeds.
pub fn read_sheet(path: &Path, readers: &[Box<dyn SheetReader>]) -> Result<LoadedSheet, SheetError> {
    let mut last_error = None;

    for reader in readers.iter().filter(|r| r.can_read(path)) {
        match reader.read_first_sheet(path) {
            Ok(grid) => {
                return Ok(LoadedSheet {
                    reader: reader.name(),
                    grid,
                });
            }
            Err(e) => {
                log::debug!("{} reader failed on {}: {}", reader.name(), path.display(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        SheetError::unsupported(format!("no reader handles {}", path.display()))
    }))
}

/// Trim trailing empty cells from every row and drop trailing empty rows.
///
/// Readers differ in how far they pad ragged rows; this gives them a
/// common shape.
pub fn normalize_grid(mut grid: Grid) -> Grid {
    for row in grid.iter_mut() {
        while matches!(row.last(), Some(None)) {
            row.pop();
        }
    }
    while matches!(grid.last(), Some(row) if row.is_empty()) {
        grid.pop();
    }
    grid
}

/// Store a cell at `(row, col)`, growing the grid as needed.
pub(crate) fn place_cell(grid: &mut Grid, row: usize, col: usize, value: Option<CellValue>) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, None);
    }
    cells[col] = value;
}
