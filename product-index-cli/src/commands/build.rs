use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use product_index_lib::{
    BuildReport, Settings, SheetReader, available_readers, builtin_readers, export_content,
};

use crate::cli_types::BuildArgs;
use crate::error::CliError;

/// Apply command-line path overrides on top of loaded settings.
pub(crate) fn apply_overrides(settings: &mut Settings, args: &BuildArgs) {
    if let Some(sheet) = &args.sheet {
        settings.paths.spreadsheet = sheet.clone();
    }
    if let Some(items) = &args.items {
        settings.paths.items_dir = items.clone();
    }
    if let Some(website_dir) = &args.website_dir {
        settings.paths.website_dir = website_dir.clone();
    }
    if let Some(output) = &args.output {
        settings.paths.output = output.clone();
    }
    if let Some(extensions) = &args.extensions {
        settings.images.extensions = extensions.clone();
    }
}

fn readers(no_workbook_reader: bool) -> Vec<Box<dyn SheetReader>> {
    if no_workbook_reader {
        builtin_readers()
    } else {
        available_readers()
    }
}

/// Build the image index, optionally exporting content files afterwards.
pub(crate) fn run_build(
    base: &Path,
    args: BuildArgs,
    export: bool,
    content_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut settings = product_index_lib::load_settings(base);
    apply_overrides(&mut settings, &args);
    if let Some(dir) = content_dir {
        settings.paths.content_dir = dir;
    }

    let report =
        product_index_lib::run_build(base, &settings, &readers(args.no_workbook_reader))?;
    print_summary(&report);

    if export {
        let dir = settings.content_path(base);
        let exported = export_content(&report.records, &dir)?;
        if exported.incomplete > 0 {
            log::warn!(
                "{} of {} content files are missing schema fields",
                exported.incomplete,
                exported.written.len()
            );
        }
    }

    Ok(())
}

fn print_summary(report: &BuildReport) {
    log::info!("");
    log::info!(
        "{} {} products, {} images ({} metadata rows)",
        "Summary:".if_supports_color(Stdout, |t| t.bold()),
        report.product_count(),
        report.image_count,
        report.metadata_rows,
    );
    if report.unmatched > 0 {
        log::info!(
            "  {} folders without spreadsheet metadata",
            report.unmatched.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    if report.ambiguous > 0 {
        log::warn!(
            "  {} folders matched ambiguous spreadsheet rows",
            report.ambiguous
        );
    }
}
