//! Shared data model for the product index: spreadsheet cell values,
//! metadata rows, availability and product folder names.
//!
//! This crate has no I/O. The sheet readers and the pipeline stages in
//! `product-index-lib` all speak these types.

pub mod cell;
pub mod folder;
pub mod row;
pub mod status;

pub use cell::CellValue;
pub use folder::ProductFolder;
pub use row::{MetadataField, MetadataRow};
pub use status::Availability;

/// Image file extensions recognized inside a product's `Website` folder.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];
