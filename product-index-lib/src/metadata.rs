//! Metadata loader: product spreadsheet → lookup index.
//!
//! The sheet is read into a [`Grid`] by whichever reader succeeds first, then
//! folded into a [`MetadataIndex`]. Loading never fails: a missing,
//! unreadable or header-less sheet yields an empty index and a log line, and
//! products simply go out without metadata.

use std::collections::HashMap;
use std::path::Path;

use product_index_core::{CellValue, MetadataField, MetadataRow};
use product_index_sheet::{Grid, SheetReader, read_sheet};

use crate::error::IndexError;

/// Number of keys shown in the "sample keys" diagnostic.
const SAMPLE_KEY_COUNT: usize = 10;

/// Lookup structures over the spreadsheet rows. Built once, read-only after.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    rows: Vec<MetadataRow>,
    /// Item name or `"<ID> <Item>"` → row index. Later rows overwrite earlier ones.
    by_exact_key: HashMap<String, usize>,
    /// Item name → every row with that name, in sheet order.
    by_item_name: HashMap<String, Vec<usize>>,
    /// Exact keys in first-insertion order.
    key_order: Vec<String>,
}

impl MetadataIndex {
    /// Build an index from a sheet grid whose first row is the header.
    ///
    /// Fails only when the header has no "Item" column.
    pub fn from_grid(grid: &Grid) -> Result<Self, IndexError> {
        let header = grid.first().ok_or(IndexError::MissingItemHeader)?;
        let columns = ColumnMap::from_header(header);
        let item_col = columns
            .first_column(MetadataField::Item)
            .ok_or(IndexError::MissingItemHeader)?;

        let mut index = Self::default();
        for cells in grid.iter().skip(1) {
            let Some(item) = cell_at(cells, item_col) else {
                continue;
            };
            let mut row = MetadataRow::new(item.key_string());
            for field in MetadataField::ALL {
                if let Some(slot) = row.slot_mut(field) {
                    *slot = columns.value(cells, field);
                }
            }
            index.insert(row);
        }

        Ok(index)
    }

    /// Add a row to both lookups.
    pub fn insert(&mut self, row: MetadataRow) {
        let idx = self.rows.len();
        let item = row.item.clone();
        let composite = row.composite_key();
        self.rows.push(row);

        self.by_item_name.entry(item.clone()).or_default().push(idx);
        self.insert_key(item, idx);
        if let Some(key) = composite {
            self.insert_key(key, idx);
        }
    }

    /// Add a row reachable only through the item-name candidates.
    #[cfg(test)]
    pub(crate) fn insert_candidate_only(&mut self, row: MetadataRow) {
        let idx = self.rows.len();
        self.by_item_name.entry(row.item.clone()).or_default().push(idx);
        self.rows.push(row);
    }

    fn insert_key(&mut self, key: String, idx: usize) {
        if self.by_exact_key.insert(key.clone(), idx).is_none() {
            self.key_order.push(key);
        }
    }

    /// Row registered under an exact (plain or composite) key.
    pub fn get_exact(&self, key: &str) -> Option<&MetadataRow> {
        self.by_exact_key.get(key).map(|&i| &self.rows[i])
    }

    /// All rows sharing an item name, in sheet order.
    pub fn candidates(&self, item: &str) -> Vec<&MetadataRow> {
        self.by_item_name
            .get(item)
            .map(|ids| ids.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    /// Number of parsed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MetadataRow] {
        &self.rows
    }

    /// Number of item names that appear on more than one row.
    pub fn duplicate_item_count(&self) -> usize {
        self.by_item_name.values().filter(|ids| ids.len() > 1).count()
    }

    /// The first `n` exact keys in insertion order.
    pub fn sample_keys(&self, n: usize) -> &[String] {
        &self.key_order[..n.min(self.key_order.len())]
    }
}

/// Which grid columns feed which field.
///
/// A field may have several candidate columns (e.g. "Price PLN" and
/// "Price"); they are kept in header preference order.
struct ColumnMap {
    columns: HashMap<MetadataField, Vec<usize>>,
}

impl ColumnMap {
    fn from_header(header: &[Option<CellValue>]) -> Self {
        // (field, rank) → column; a repeated header keeps its right-most column.
        let mut by_rank: HashMap<(MetadataField, usize), usize> = HashMap::new();
        for (col, cell) in header.iter().enumerate() {
            let Some(cell) = cell else { continue };
            if let Some(key) = MetadataField::from_header(&cell.key_string()) {
                by_rank.insert(key, col);
            }
        }

        let mut ranked: Vec<((MetadataField, usize), usize)> = by_rank.into_iter().collect();
        ranked.sort_by_key(|((_, rank), _)| *rank);

        let mut columns: HashMap<MetadataField, Vec<usize>> = HashMap::new();
        for ((field, _), col) in ranked {
            columns.entry(field).or_default().push(col);
        }
        Self { columns }
    }

    fn first_column(&self, field: MetadataField) -> Option<usize> {
        self.columns.get(&field).and_then(|cols| cols.first().copied())
    }

    /// First non-empty value among the field's columns.
    fn value(&self, cells: &[Option<CellValue>], field: MetadataField) -> Option<CellValue> {
        self.columns
            .get(&field)?
            .iter()
            .find_map(|&col| cell_at(cells, col).cloned())
    }

    /// Headers recognized in this sheet, for diagnostics.
    fn recognized(&self) -> Vec<&'static str> {
        MetadataField::ALL
            .iter()
            .filter(|f| self.columns.contains_key(*f))
            .map(|f| f.display_name())
            .collect()
    }
}

fn cell_at(cells: &[Option<CellValue>], col: usize) -> Option<&CellValue> {
    cells.get(col).and_then(Option::as_ref)
}

/// Load the product spreadsheet into a [`MetadataIndex`].
///
/// Never fails; every problem is logged and answered with an empty index.
pub fn load_metadata(path: &Path, readers: &[Box<dyn SheetReader>]) -> MetadataIndex {
    if !path.is_file() {
        log::info!(
            "Spreadsheet not found at {}; continuing without metadata.",
            path.display()
        );
        return MetadataIndex::default();
    }

    let sheet = match read_sheet(path, readers) {
        Ok(sheet) => sheet,
        Err(e) => {
            log::warn!(
                "Failed to read spreadsheet metadata from {}: {}; continuing without metadata.",
                path.display(),
                e
            );
            return MetadataIndex::default();
        }
    };

    let index = match MetadataIndex::from_grid(&sheet.grid) {
        Ok(index) => index,
        Err(_) => {
            log::warn!(
                "Spreadsheet found but required column \"Item\" not present; continuing without metadata."
            );
            return MetadataIndex::default();
        }
    };

    if let Some(header) = sheet.grid.first() {
        let headers: Vec<String> = header
            .iter()
            .map(|c| c.as_ref().map(CellValue::key_string).unwrap_or_default())
            .collect();
        log::info!("Spreadsheet loaded via {}: headers found: {:?}", sheet.reader, headers);
        log::debug!("Recognized columns: {:?}", ColumnMap::from_header(header).recognized());
    }
    log::info!(
        "Total rows in spreadsheet (excluding header): {}",
        sheet.grid.len().saturating_sub(1)
    );
    log::info!("Metadata entries parsed: {}", index.len());

    let duplicates = index.duplicate_item_count();
    if duplicates > 0 {
        log::warn!(
            "{} Item names have multiple metadata rows (duplicates). Prefer folder names with ID prefix to disambiguate.",
            duplicates
        );
    }

    let sample = index.sample_keys(SAMPLE_KEY_COUNT);
    if !sample.is_empty() {
        log::info!("Sample keys from spreadsheet mapping (exact/composite): {:?}", sample);
    }

    index
}
