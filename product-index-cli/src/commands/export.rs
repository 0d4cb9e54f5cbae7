use std::path::{Path, PathBuf};

use product_index_lib::{export_content, load_settings, read_index};

use crate::error::CliError;

/// Convert an existing index file into per-product content files.
pub(crate) fn run_export(
    base: &Path,
    input: Option<PathBuf>,
    content_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(base);
    let input = input
        .map(|p| base.join(p))
        .unwrap_or_else(|| settings.output_path(base));
    let dir = content_dir
        .map(|p| base.join(p))
        .unwrap_or_else(|| settings.content_path(base));

    log::info!("Reading {}", input.display());
    let records = read_index(&input)?;
    let report = export_content(&records, &dir)?;
    if report.incomplete > 0 {
        log::warn!(
            "{} of {} content files are missing schema fields",
            report.incomplete,
            report.written.len()
        );
    }
    Ok(())
}
