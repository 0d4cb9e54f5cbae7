//! Per-catalog settings (`product-index.toml` in the base directory).
//!
//! Every field has a default matching the catalog's conventional layout, so
//! the file is optional. CLI flags override whatever is loaded here.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use product_index_core::DEFAULT_IMAGE_EXTENSIONS;

use crate::error::IndexError;

/// File name of the settings file inside the base directory.
pub const SETTINGS_FILE: &str = "product-index.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub images: ImageSettings,
}

/// Locations of inputs and outputs. Relative paths resolve against the base
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_spreadsheet")]
    pub spreadsheet: PathBuf,
    #[serde(default = "default_items_dir")]
    pub items_dir: PathBuf,
    /// Subdirectory of each product folder holding the published images.
    #[serde(default = "default_website_dir")]
    pub website_dir: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Recognized image extensions, matched case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_spreadsheet() -> PathBuf {
    PathBuf::from("dataSet.xlsx")
}

fn default_items_dir() -> PathBuf {
    PathBuf::from("Items")
}

fn default_website_dir() -> String {
    "Website".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("images_index.json")
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content").join("products")
}

fn default_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            spreadsheet: default_spreadsheet(),
            items_dir: default_items_dir(),
            website_dir: default_website_dir(),
            output: default_output(),
            content_dir: default_content_dir(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl Settings {
    /// Lowercase extension set without leading dots.
    pub fn extension_set(&self) -> HashSet<String> {
        self.images
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn spreadsheet_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.spreadsheet)
    }

    pub fn items_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.items_dir)
    }

    pub fn output_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.output)
    }

    pub fn content_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.content_dir)
    }
}

/// Path to the settings file for a base directory.
pub fn settings_path(base: &Path) -> PathBuf {
    base.join(SETTINGS_FILE)
}

/// Load settings for a base directory, returning defaults if missing or corrupt.
pub fn load_settings(base: &Path) -> Settings {
    let path = settings_path(base);
    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("Failed to parse settings at {}: {}", path.display(), e);
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

/// Save settings atomically (write to temp, then rename).
pub fn save_settings(base: &Path, settings: &Settings) -> Result<PathBuf, IndexError> {
    let path = settings_path(base);
    let contents =
        toml::to_string_pretty(settings).map_err(|e| IndexError::settings(e.to_string()))?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, contents).map_err(|e| IndexError::write(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| IndexError::write(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(tmp.path());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.paths.spreadsheet, PathBuf::from("dataSet.xlsx"));
        assert_eq!(settings.paths.output, PathBuf::from("images_index.json"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            settings_path(tmp.path()),
            "[paths]\nspreadsheet = \"products.csv\"\n\n[images]\nextensions = [\".PNG\", \"avif\"]\n",
        )
        .unwrap();

        let settings = load_settings(tmp.path());
        assert_eq!(settings.paths.spreadsheet, PathBuf::from("products.csv"));
        assert_eq!(settings.paths.items_dir, PathBuf::from("Items"));
        let exts = settings.extension_set();
        assert!(exts.contains("png"));
        assert!(exts.contains("avif"));
        assert!(!exts.contains("jpg"));
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(settings_path(tmp.path()), "[paths\nbroken").unwrap();
        assert_eq!(load_settings(tmp.path()), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.paths.website_dir = "Web".to_string();
        let path = save_settings(tmp.path(), &settings).unwrap();
        assert_eq!(path, settings_path(tmp.path()));
        assert_eq!(load_settings(tmp.path()), settings);
    }
}
