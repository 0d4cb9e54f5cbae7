use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use product_index_lib::settings::settings_path;
use product_index_lib::{Settings, load_settings, save_settings};

use crate::error::CliError;

/// Show effective settings and whether they come from a file.
pub(crate) fn run_config_show(base: &Path) {
    let path = settings_path(base);
    let settings = load_settings(base);

    log::info!(
        "{}",
        "Product Index Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let fields = [
        ("spreadsheet", settings.spreadsheet_path(base).display().to_string()),
        ("items_dir", settings.items_path(base).display().to_string()),
        ("website_dir", settings.paths.website_dir.clone()),
        ("output", settings.output_path(base).display().to_string()),
        ("content_dir", settings.content_path(base).display().to_string()),
        ("extensions", settings.images.extensions.join(", ")),
    ];
    for (name, value) in fields {
        log::info!("  {:<12} {}", name, value);
    }
}

/// Write a settings file holding the defaults.
pub(crate) fn run_config_init(base: &Path, force: bool) -> Result<(), CliError> {
    let path = settings_path(base);
    if path.exists() && !force {
        return Err(CliError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let written = save_settings(base, &Settings::default())?;
    log::info!(
        "Wrote {}",
        written.display().if_supports_color(Stdout, |t| t.green())
    );
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path(base: &Path) {
    println!("{}", settings_path(base).display());
}
