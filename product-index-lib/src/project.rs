//! Record projector: resolved products → the published `images_index.json`
//! schema.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use product_index_core::{Availability, CellValue};

use crate::error::IndexError;
use crate::gather::ResolvedProduct;

/// One element of the exported JSON array.
///
/// Every field is always present; unset values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<CellValue>,
    pub status: Availability,
    pub product_name: String,
    pub size_eu: Option<CellValue>,
    pub collection: Option<CellValue>,
    #[serde(rename = "type")]
    pub kind: Option<CellValue>,
    pub price_pln: Option<CellValue>,
    pub fabric: Option<CellValue>,
    pub base: Option<CellValue>,
    pub website_des: Option<CellValue>,
    pub images: Vec<String>,
}

/// Flatten a resolved product into its exported record.
pub fn project(product: &ResolvedProduct) -> ProductRecord {
    let meta = product.metadata.clone().unwrap_or_default();
    let product_name = if product.item.is_empty() {
        product.folder.clone()
    } else {
        product.item.clone()
    };

    ProductRecord {
        id: product.id.clone().map(integer_id),
        status: project_status(product),
        product_name,
        size_eu: meta.size,
        collection: meta.collection,
        kind: meta.kind,
        price_pln: meta.price,
        fabric: meta.fabric,
        base: meta.base,
        website_des: meta.website_description,
        images: product.images.clone(),
    }
}

/// Project every product, keeping gather order.
pub fn project_all(products: &[ResolvedProduct]) -> Vec<ProductRecord> {
    products.iter().map(project).collect()
}

fn integer_id(id: CellValue) -> CellValue {
    match id.as_integer() {
        Some(n) => CellValue::Int(n),
        None => id,
    }
}

/// `State` wins; without it the legacy `Availability` column is tried, first
/// as inventory text, then as a literal "available" flag.
fn project_status(product: &ResolvedProduct) -> Availability {
    let meta = product.metadata.as_ref();
    let availability = meta.and_then(|m| m.availability.as_ref());
    let has_state = meta.is_some_and(|m| m.state.is_some());

    let from_text = if has_state {
        product.status
    } else {
        availability.and_then(|a| Availability::from_state_text(&a.key_string()))
    };

    from_text
        .or_else(|| availability.map(|a| Availability::from_flag(&a.key_string())))
        .unwrap_or(Availability::Unknown)
}

/// Render records as a pretty-printed JSON array (two-space indent, no
/// trailing newline, non-ASCII kept as-is).
pub fn render_index(records: &[ProductRecord]) -> Result<String, IndexError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the index atomically. The parent directory must already exist.
pub fn write_index(path: &Path, records: &[ProductRecord]) -> Result<(), IndexError> {
    let contents = render_index(records)?;
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, contents).map_err(|e| IndexError::write(path, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(IndexError::write(path, e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "images_index.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Total number of image paths across all records.
pub fn image_count(records: &[ProductRecord]) -> usize {
    records.iter().map(|r| r.images.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::{MatchTier, Resolution};
    use product_index_core::{MetadataRow, ProductFolder};

    fn resolved(folder: &str, row: Option<&MetadataRow>) -> ResolvedProduct {
        let folder = ProductFolder::parse(folder);
        let resolution = Resolution {
            row,
            tier: if row.is_some() {
                MatchTier::ItemName
            } else {
                MatchTier::Unmatched
            },
            ambiguous_ids: None,
        };
        ResolvedProduct::new(&folder, vec!["Items/x/Website/a.png".to_string()], resolution)
    }

    #[test]
    fn test_unmatched_folder_projection() {
        let record = project(&resolved("10 Dusty Plate Pants", None));
        assert_eq!(record.id, Some(CellValue::Int(10)));
        assert_eq!(record.product_name, "Dusty Plate Pants");
        assert_eq!(record.status, Availability::Unknown);
        assert_eq!(record.price_pln, None);
    }

    #[test]
    fn test_text_ids_pass_through() {
        let row = MetadataRow::new("Ring").with_id("007");
        let record = project(&resolved("Ring", Some(&row)));
        assert_eq!(record.id, Some(CellValue::Text("007".to_string())));

        let row = MetadataRow::new("Ring").with_id("R-42");
        let record = project(&resolved("Ring", Some(&row)));
        assert_eq!(record.id, Some(CellValue::Text("R-42".to_string())));
    }

    #[test]
    fn test_whole_float_id_becomes_integer() {
        let row = MetadataRow::new("Ring").with_id(CellValue::Float(42.0));
        let record = project(&resolved("Ring", Some(&row)));
        assert_eq!(record.id, Some(CellValue::Int(42)));
    }

    #[test]
    fn test_status_from_state() {
        let row = MetadataRow::new("Ring").with_state("SOLD OUT");
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Unavailable);

        let row = MetadataRow::new("Ring").with_state("IN STOCK");
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Available);
    }

    #[test]
    fn test_status_from_availability_column() {
        let mut row = MetadataRow::new("Ring");
        row.availability = Some(CellValue::from("available"));
        // "available" contains no "in", so the literal flag decides
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Available);

        row.availability = Some(CellValue::from("gone"));
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Unavailable);

        row.availability = Some(CellValue::from("in store"));
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Available);
    }

    #[test]
    fn test_state_without_keyword_falls_back_to_flag() {
        let mut row = MetadataRow::new("Ring").with_state("pending");
        // "pending" contains "in"
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Available);

        row.state = Some(CellValue::from("???"));
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Unknown);
        row.availability = Some(CellValue::from("available"));
        assert_eq!(project(&resolved("Ring", Some(&row))).status, Availability::Available);
    }

    #[test]
    fn test_null_fields_are_kept() {
        let record = project(&resolved("Ring", None));
        let json = render_index(&[record]).unwrap();
        for key in [
            "\"id\": null",
            "\"status\": \"Unknown\"",
            "\"size_eu\": null",
            "\"collection\": null",
            "\"type\": null",
            "\"price_pln\": null",
            "\"fabric\": null",
            "\"base\": null",
            "\"website_des\": null",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert!(!json.ends_with('\n'));
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let record = project(&resolved("Sukienka Łódź", None));
        let json = render_index(&[record]).unwrap();
        assert!(json.contains("Sukienka Łódź"));
    }

    #[test]
    fn test_temp_sibling() {
        assert_eq!(
            temp_sibling(Path::new("/a/images_index.json")),
            PathBuf::from("/a/images_index.json.tmp")
        );
    }
}
