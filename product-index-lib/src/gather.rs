//! Image gatherer: walks `Items/*/Website`, collects image paths per product
//! folder and joins each folder with its spreadsheet row.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use product_index_core::{Availability, CellValue, MetadataRow, ProductFolder};

use crate::error::IndexError;
use crate::metadata::MetadataIndex;

/// How a folder was matched to its spreadsheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Full folder name found among exact keys (plain or composite).
    FolderName,
    /// ID-stripped item name found among exact keys.
    ItemName,
    /// Only one row carries the item name.
    UniqueItem,
    /// Several rows carry the item name; the folder ID picked one.
    FolderId,
    /// Several rows carry the item name and none matched the folder ID.
    Ambiguous,
    /// No row carries the item name.
    Unmatched,
}

impl MatchTier {
    pub fn description(&self) -> &'static str {
        match self {
            Self::FolderName => "folder name",
            Self::ItemName => "item name",
            Self::UniqueItem => "unique item",
            Self::FolderId => "folder ID",
            Self::Ambiguous => "ambiguous, first row",
            Self::Unmatched => "no metadata",
        }
    }
}

/// Result of looking up one folder in the metadata index.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub row: Option<&'a MetadataRow>,
    pub tier: MatchTier,
    /// Candidate IDs when several rows matched and none could be chosen.
    pub ambiguous_ids: Option<Vec<CellValue>>,
}

impl<'a> Resolution<'a> {
    fn matched(row: &'a MetadataRow, tier: MatchTier) -> Self {
        Self {
            row: Some(row),
            tier,
            ambiguous_ids: None,
        }
    }
}

/// Find the spreadsheet row for a folder. First match wins:
///
/// 1. full folder name as an exact key
/// 2. ID-stripped item name as an exact key
/// 3. rows sharing the item name: the only one, else the one whose ID equals
///    the folder's ID prefix, else the first (flagged ambiguous)
pub fn resolve_metadata<'a>(folder: &ProductFolder, index: &'a MetadataIndex) -> Resolution<'a> {
    if let Some(row) = index.get_exact(&folder.name) {
        return Resolution::matched(row, MatchTier::FolderName);
    }
    if let Some(row) = index.get_exact(&folder.item) {
        return Resolution::matched(row, MatchTier::ItemName);
    }

    let candidates = index.candidates(&folder.item);
    match candidates.as_slice() {
        [] => Resolution {
            row: None,
            tier: MatchTier::Unmatched,
            ambiguous_ids: None,
        },
        [only] => Resolution::matched(*only, MatchTier::UniqueItem),
        [first, ..] => {
            if let Some(prefix) = folder.id_prefix.as_deref() {
                let chosen = candidates
                    .iter()
                    .find(|row| row.normalized_id().as_deref() == Some(prefix.trim()));
                if let Some(row) = chosen {
                    return Resolution::matched(*row, MatchTier::FolderId);
                }
            }
            let ids: Vec<CellValue> = candidates.iter().filter_map(|row| row.id.clone()).collect();
            Resolution {
                row: Some(*first),
                tier: MatchTier::Ambiguous,
                ambiguous_ids: Some(ids),
            }
        }
    }
}

/// A product folder joined with its images and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct {
    /// Full folder name as listed under `Items`.
    pub folder: String,
    /// Clean, ID-stripped item name.
    pub item: String,
    /// Spreadsheet ID, else the folder's ID prefix.
    pub id: Option<CellValue>,
    /// Availability derived from the row's `State`.
    pub status: Option<Availability>,
    pub metadata: Option<MetadataRow>,
    /// Image paths relative to the base directory, `/`-separated, sorted.
    pub images: Vec<String>,
    pub tier: MatchTier,
    pub ambiguous_ids: Option<Vec<CellValue>>,
}

impl ResolvedProduct {
    /// Join a folder with its images and resolution result.
    pub fn new(folder: &ProductFolder, images: Vec<String>, resolution: Resolution<'_>) -> Self {
        let metadata = resolution.row.cloned();
        let id = metadata
            .as_ref()
            .and_then(|m| m.id.clone())
            .or_else(|| folder.id_value());
        let status = metadata
            .as_ref()
            .and_then(|m| m.state.as_ref())
            .and_then(|state| Availability::from_state_text(&state.key_string()));

        Self {
            folder: folder.name.clone(),
            item: folder.item.clone(),
            id,
            status,
            metadata,
            images,
            tier: resolution.tier,
            ambiguous_ids: resolution.ambiguous_ids,
        }
    }
}

/// Where to look for product images.
#[derive(Debug, Clone)]
pub struct ScanLayout {
    /// Directory holding one subdirectory per product.
    pub items_dir: PathBuf,
    /// Name of the image subdirectory inside each product folder.
    pub website_dir: String,
    /// Lowercase image extensions without dots.
    pub extensions: HashSet<String>,
}

/// Enumerate product folders in name order, collect their images and
/// resolve their metadata.
///
/// A missing items directory yields no products. Folders without a website
/// subdirectory or without images are skipped.
pub fn gather_products(
    base: &Path,
    layout: &ScanLayout,
    index: &MetadataIndex,
) -> Result<Vec<ResolvedProduct>, IndexError> {
    if !layout.items_dir.is_dir() {
        log::info!(
            "Items directory not found at {}; no products to index.",
            layout.items_dir.display()
        );
        return Ok(Vec::new());
    }

    let mut products = Vec::new();
    for folder_path in sorted_entries(&layout.items_dir)? {
        if !folder_path.is_dir() {
            continue;
        }
        let Some(name) = folder_path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping folder with non-UTF-8 name: {}", folder_path.display());
            continue;
        };

        let website = folder_path.join(&layout.website_dir);
        if !website.is_dir() {
            continue;
        }
        let images = match collect_images(base, &website, &layout.extensions) {
            Ok(images) => images,
            Err(e) => {
                log::warn!("Failed to list images in {}: {}", website.display(), e);
                continue;
            }
        };
        if images.is_empty() {
            continue;
        }

        let folder = ProductFolder::parse(name);
        let resolution = resolve_metadata(&folder, index);
        if let Some(ids) = &resolution.ambiguous_ids {
            log::warn!(
                "Ambiguous metadata for item '{}': candidate IDs = [{}]; using first entry",
                folder.item,
                join_ids(ids)
            );
        }

        let product = ResolvedProduct::new(&folder, images, resolution);
        match &product.id {
            Some(id) => log::info!(
                "Matched '{}': Item='{}', ID={}, images={} ({})",
                product.folder,
                product.item,
                id,
                product.images.len(),
                product.tier.description()
            ),
            None => log::info!(
                "Processing {}: {} images found; no ID metadata",
                product.folder,
                product.images.len()
            ),
        }
        products.push(product);
    }

    Ok(products)
}

fn join_ids(ids: &[CellValue]) -> String {
    ids.iter()
        .map(CellValue::key_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Directory entries sorted by file name.
///
/// Entries that cannot be read are logged and left out.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("Failed to read entry in {}: {}", dir.display(), e),
        }
    }
    entries.sort_by_key(|e| e.file_name());
    Ok(entries.into_iter().map(|e| e.path()).collect())
}

/// Check if a path has an extension in the allowed set.
fn has_image_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

/// Image files directly inside `dir`, as sorted base-relative paths.
fn collect_images(
    base: &Path,
    dir: &Path,
    extensions: &HashSet<String>,
) -> std::io::Result<Vec<String>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && has_image_extension(p, extensions))
        .filter_map(|p| relative_slash_path(&p, base))
        .collect())
}

/// Express `path` relative to `base` with `/` separators.
pub fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, base)?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            Component::ParentDir => Some(".."),
            Component::CurDir => Some("."),
            _ => None,
        })
        .collect();
    parts.map(|p| p.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use product_index_core::MetadataRow;

    fn index_of(rows: Vec<MetadataRow>) -> MetadataIndex {
        let mut index = MetadataIndex::default();
        for row in rows {
            index.insert(row);
        }
        index
    }

    fn candidates_only(rows: Vec<MetadataRow>) -> MetadataIndex {
        let mut index = MetadataIndex::default();
        for row in rows {
            index.insert_candidate_only(row);
        }
        index
    }

    #[test]
    fn test_single_candidate_is_unique_item() {
        let index = candidates_only(vec![MetadataRow::new("Ring").with_id(5)]);
        let res = resolve_metadata(&ProductFolder::parse("9 Ring"), &index);
        assert_eq!(res.tier, MatchTier::UniqueItem);
        assert_eq!(res.row.unwrap().id, Some(CellValue::Int(5)));
        assert_eq!(res.ambiguous_ids, None);
    }

    #[test]
    fn test_folder_id_picks_candidate() {
        let index = candidates_only(vec![
            MetadataRow::new("Ring").with_id(5).with_state("IN STOCK"),
            MetadataRow::new("Ring").with_id(7).with_state("SOLD OUT"),
        ]);
        let res = resolve_metadata(&ProductFolder::parse("7 Ring"), &index);
        assert_eq!(res.tier, MatchTier::FolderId);
        assert_eq!(res.row.unwrap().id, Some(CellValue::Int(7)));
        assert_eq!(res.ambiguous_ids, None);
    }

    #[test]
    fn test_unmatched_prefix_is_ambiguous() {
        let index = candidates_only(vec![
            MetadataRow::new("Ring").with_id(5),
            MetadataRow::new("Ring"),
            MetadataRow::new("Ring").with_id(7),
        ]);
        let res = resolve_metadata(&ProductFolder::parse("9 Ring"), &index);
        assert_eq!(res.tier, MatchTier::Ambiguous);
        assert_eq!(res.row.unwrap().id, Some(CellValue::Int(5)));
        assert_eq!(
            res.ambiguous_ids,
            Some(vec![CellValue::Int(5), CellValue::Int(7)])
        );

        let res = resolve_metadata(&ProductFolder::parse("Ring"), &index);
        assert_eq!(res.tier, MatchTier::Ambiguous);
        assert_eq!(join_ids(res.ambiguous_ids.as_deref().unwrap()), "5, 7");
    }

    #[test]
    fn test_ambiguity_does_not_leak_to_next_folder() {
        let index = candidates_only(vec![
            MetadataRow::new("Ring").with_id(5),
            MetadataRow::new("Ring").with_id(7),
        ]);
        let first = ResolvedProduct::new(
            &ProductFolder::parse("9 Ring"),
            vec!["a.png".to_string()],
            resolve_metadata(&ProductFolder::parse("9 Ring"), &index),
        );
        let second = ResolvedProduct::new(
            &ProductFolder::parse("5 Ring"),
            vec!["a.png".to_string()],
            resolve_metadata(&ProductFolder::parse("5 Ring"), &index),
        );
        assert!(first.ambiguous_ids.is_some());
        assert_eq!(second.tier, MatchTier::FolderId);
        assert_eq!(second.ambiguous_ids, None);
        assert_eq!(second.id, Some(CellValue::Int(5)));
    }

    #[test]
    fn test_folder_name_beats_item_name() {
        let index = index_of(vec![
            MetadataRow::new("Ring").with_id(5),
            MetadataRow::new("Ring").with_id(7),
        ]);
        let res = resolve_metadata(&ProductFolder::parse("5 Ring"), &index);
        assert_eq!(res.tier, MatchTier::FolderName);
        assert_eq!(res.row.unwrap().id, Some(CellValue::Int(5)));
        assert_eq!(res.ambiguous_ids, None);
    }

    #[test]
    fn test_item_name_exact_key() {
        let index = index_of(vec![MetadataRow::new("Ring").with_id(5)]);
        let res = resolve_metadata(&ProductFolder::parse("9 Ring"), &index);
        assert_eq!(res.tier, MatchTier::ItemName);
        assert!(res.row.is_some());
    }

    #[test]
    fn test_unmatched_folder() {
        let index = index_of(vec![MetadataRow::new("Ring")]);
        let res = resolve_metadata(&ProductFolder::parse("10 Dusty Plate Pants"), &index);
        assert_eq!(res.tier, MatchTier::Unmatched);
        assert!(res.row.is_none());
        assert!(res.ambiguous_ids.is_none());
    }

    #[test]
    fn test_relative_slash_path() {
        let base = Path::new("/data/images");
        let path = base.join("Items").join("10 Ring").join("Website").join("a.png");
        assert_eq!(
            relative_slash_path(&path, base).as_deref(),
            Some("Items/10 Ring/Website/a.png")
        );
    }

    #[test]
    fn test_sorted_entries_by_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        for name in ["b.png", "A.png", "a.png"] {
            std::fs::write(tmp.path().join(name), b"").unwrap();
        }
        let names: Vec<String> = sorted_entries(tmp.path())
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["A.png", "a.png", "b.png"]);
    }

    #[test]
    fn test_has_image_extension() {
        let exts: HashSet<String> = ["png", "jpg"].iter().map(|s| s.to_string()).collect();
        assert!(has_image_extension(Path::new("a.PNG"), &exts));
        assert!(has_image_extension(Path::new("b.Jpg"), &exts));
        assert!(!has_image_extension(Path::new("c.txt"), &exts));
        assert!(!has_image_extension(Path::new("png"), &exts));
    }

    #[test]
    fn test_resolved_product_prefers_sheet_id() {
        let row = MetadataRow::new("Ring").with_id("R-5").with_state("IN STOCK");
        let folder = ProductFolder::parse("5 Ring");
        let res = Resolution::matched(&row, MatchTier::ItemName);
        let product = ResolvedProduct::new(&folder, vec!["x.png".to_string()], res);
        assert_eq!(product.id, Some(CellValue::Text("R-5".to_string())));
        assert_eq!(product.status, Some(Availability::Available));
        assert_eq!(product.item, "Ring");
    }
}
