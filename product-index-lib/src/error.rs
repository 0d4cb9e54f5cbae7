use thiserror::Error;

use product_index_sheet::SheetError;

/// Errors that can occur while building or exporting the product index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error while scanning the product tree
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An output file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    /// The spreadsheet could not be read by any reader
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// The spreadsheet header row has no "Item" column
    #[error("Spreadsheet has no \"Item\" column")]
    MissingItemHeader,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// Settings file could not be parsed or serialized
    #[error("Settings error: {0}")]
    Settings(String),
}

impl IndexError {
    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}
