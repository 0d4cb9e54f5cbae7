//! Build pipeline for the product image index.
//!
//! Load spreadsheet metadata, gather product image folders, project them to
//! the published schema and write `images_index.json`.

use std::path::{Path, PathBuf};

pub mod error;
pub mod export;
pub mod gather;
pub mod metadata;
pub mod project;
pub mod settings;

pub use error::IndexError;
pub use export::{ExportReport, export_content, read_index};
pub use gather::{MatchTier, ResolvedProduct, ScanLayout, gather_products, resolve_metadata};
pub use metadata::{MetadataIndex, load_metadata};
pub use project::{ProductRecord, project, project_all, write_index};
pub use settings::{Settings, load_settings, save_settings};

pub use product_index_sheet::{SheetReader, available_readers, builtin_readers};

/// Summary of one build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output: PathBuf,
    pub records: Vec<ProductRecord>,
    pub image_count: usize,
    /// Spreadsheet rows loaded (0 when no usable sheet was found).
    pub metadata_rows: usize,
    /// Folders that resolved to an ambiguous spreadsheet row.
    pub ambiguous: usize,
    /// Folders with no spreadsheet row at all.
    pub unmatched: usize,
}

impl BuildReport {
    pub fn product_count(&self) -> usize {
        self.records.len()
    }
}

/// Scan layout for a base directory under the given settings.
pub fn scan_layout(base: &Path, settings: &Settings) -> ScanLayout {
    ScanLayout {
        items_dir: settings.items_path(base),
        website_dir: settings.paths.website_dir.clone(),
        extensions: settings.extension_set(),
    }
}

/// Run the whole pipeline for `base`.
///
/// Only a failure to write the output is an error; every input problem
/// degrades to fewer products or products without metadata.
pub fn run_build(
    base: &Path,
    settings: &Settings,
    readers: &[Box<dyn SheetReader>],
) -> Result<BuildReport, IndexError> {
    let index = load_metadata(&settings.spreadsheet_path(base), readers);
    let products = gather_products(base, &scan_layout(base, settings), &index)?;

    let ambiguous = products.iter().filter(|p| p.ambiguous_ids.is_some()).count();
    let unmatched = products
        .iter()
        .filter(|p| p.tier == MatchTier::Unmatched)
        .count();

    let records = project_all(&products);
    let output = settings.output_path(base);
    write_index(&output, &records)?;

    let image_count = project::image_count(&records);
    log::info!(
        "Wrote {} with {} products and {} image paths",
        output.display(),
        records.len(),
        image_count
    );

    Ok(BuildReport {
        output,
        records,
        image_count,
        metadata_rows: index.len(),
        ambiguous,
        unmatched,
    })
}
