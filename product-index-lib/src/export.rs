//! Content export: one Markdown file with YAML frontmatter per product, for
//! the site's content collection.

use std::path::{Path, PathBuf};

use serde::Serialize;

use product_index_core::{Availability, CellValue};

use crate::error::IndexError;
use crate::project::ProductRecord;

/// Outcome of a content export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Files written, in record order.
    pub written: Vec<PathBuf>,
    /// Records written despite failing the content schema.
    pub incomplete: usize,
}

/// Read a previously written `images_index.json`.
pub fn read_index(path: &Path) -> Result<Vec<ProductRecord>, IndexError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Lowercase ASCII slug: runs of anything outside `[a-z0-9]` become a single
/// `-`, with no leading or trailing `-`.
pub fn content_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

/// `<slug>-<id>.md`; a missing ID renders as `null`.
pub fn content_file_name(record: &ProductRecord) -> String {
    let id = record
        .id
        .as_ref()
        .map(CellValue::key_string)
        .unwrap_or_else(|| "null".to_string());
    format!("{}-{}.md", content_slug(&record.product_name), id)
}

/// Frontmatter as the content schema types it: text fields are always
/// strings, even when the sheet cell held a number.
#[derive(Debug, Serialize)]
struct Frontmatter<'a> {
    id: Option<&'a CellValue>,
    status: Availability,
    product_name: &'a str,
    size_eu: Option<String>,
    collection: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    price_pln: Option<&'a CellValue>,
    fabric: Option<String>,
    base: Option<String>,
    website_des: Option<String>,
    images: &'a [String],
}

impl<'a> From<&'a ProductRecord> for Frontmatter<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        let text = |value: &Option<CellValue>| value.as_ref().map(CellValue::key_string);
        Self {
            id: record.id.as_ref(),
            status: record.status,
            product_name: &record.product_name,
            size_eu: text(&record.size_eu),
            collection: text(&record.collection),
            kind: text(&record.kind),
            price_pln: record.price_pln.as_ref(),
            fabric: text(&record.fabric),
            base: text(&record.base),
            website_des: text(&record.website_des),
            images: &record.images,
        }
    }
}

/// Render the frontmatter-only Markdown body for a record.
pub fn render_content(record: &ProductRecord) -> Result<String, IndexError> {
    let yaml = serde_yml::to_string(&Frontmatter::from(record))?;
    Ok(format!("---\n{}---\n", yaml))
}

/// Fields that would fail the site's content schema.
pub fn schema_problems(record: &ProductRecord) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if !record.id.as_ref().is_some_and(CellValue::is_numeric) {
        problems.push("id");
    }
    if record.status == Availability::Unknown {
        problems.push("status");
    }
    let required = [
        ("size_eu", &record.size_eu),
        ("collection", &record.collection),
        ("type", &record.kind),
        ("fabric", &record.fabric),
        ("website_des", &record.website_des),
    ];
    for (name, value) in required {
        if value.is_none() {
            problems.push(name);
        }
    }
    if !record.price_pln.as_ref().is_some_and(CellValue::is_numeric) {
        problems.push("price_pln");
    }
    problems
}

/// Write one content file per record into `dir`, creating it if needed.
pub fn export_content(records: &[ProductRecord], dir: &Path) -> Result<ExportReport, IndexError> {
    std::fs::create_dir_all(dir).map_err(|e| IndexError::write(dir, e))?;

    let mut report = ExportReport::default();
    for record in records {
        let file_name = content_file_name(record);
        let path = dir.join(&file_name);
        let body = render_content(record)?;
        std::fs::write(&path, body).map_err(|e| IndexError::write(&path, e))?;
        log::info!("Created: {}", file_name);

        let problems = schema_problems(record);
        if !problems.is_empty() {
            log::warn!(
                "{} does not satisfy the content schema (missing or invalid: {})",
                file_name,
                problems.join(", ")
            );
            report.incomplete += 1;
        }
        report.written.push(path);
    }

    log::info!(
        "Successfully converted {} products to content collections.",
        report.written.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord {
            id: Some(CellValue::Int(10)),
            status: Availability::Unavailable,
            product_name: "Dusty Plate Pants".to_string(),
            size_eu: Some(CellValue::from("M")),
            collection: Some(CellValue::from("One Peace")),
            kind: Some(CellValue::from("Pants")),
            price_pln: Some(CellValue::Int(150)),
            fabric: Some(CellValue::from("Denim")),
            base: None,
            website_des: Some(CellValue::from("Washed denim")),
            images: vec!["Items/10 Dusty Plate Pants/Website/a.png".to_string()],
        }
    }

    #[test]
    fn test_content_slug() {
        assert_eq!(content_slug("Dusty Plate Pants"), "dusty-plate-pants");
        assert_eq!(content_slug("  T-Shirt (Black)!  "), "t-shirt-black");
        assert_eq!(content_slug("Łódź Coat"), "d-coat");
        assert_eq!(content_slug("***"), "");
    }

    #[test]
    fn test_content_file_name() {
        let mut rec = record();
        assert_eq!(content_file_name(&rec), "dusty-plate-pants-10.md");
        rec.id = None;
        assert_eq!(content_file_name(&rec), "dusty-plate-pants-null.md");
    }

    #[test]
    fn test_render_content_frontmatter() {
        let body = render_content(&record()).unwrap();
        assert!(body.starts_with("---\nid: 10\nstatus: Unavailable\n"));
        assert!(body.contains("product_name: Dusty Plate Pants\n"));
        assert!(body.contains("price_pln: 150\n"));
        assert!(body.contains("base: null\n"));
        assert!(body.ends_with("---\n"));
    }

    fn frontmatter_of(body: &str) -> serde_yml::Value {
        let yaml = body
            .strip_prefix("---\n")
            .and_then(|b| b.strip_suffix("---\n"))
            .unwrap();
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_numeric_text_fields_render_as_strings() {
        let mut rec = record();
        rec.size_eu = Some(CellValue::Int(42));
        rec.collection = Some(CellValue::Int(2024));
        rec.kind = Some(CellValue::Float(1.5));
        rec.base = Some(CellValue::Int(3));
        let body = render_content(&rec).unwrap();
        assert!(!body.contains("size_eu: 42\n"));

        let fm = frontmatter_of(&body);
        assert_eq!(fm["size_eu"].as_str(), Some("42"));
        assert_eq!(fm["collection"].as_str(), Some("2024"));
        assert_eq!(fm["type"].as_str(), Some("1.5"));
        assert_eq!(fm["base"].as_str(), Some("3"));
        assert_eq!(fm["product_name"].as_str(), Some("Dusty Plate Pants"));
        assert_eq!(fm["status"].as_str(), Some("Unavailable"));
        assert_eq!(fm["id"].as_i64(), Some(10));
        assert_eq!(fm["price_pln"].as_i64(), Some(150));
        assert!(schema_problems(&rec).is_empty());
    }

    #[test]
    fn test_schema_problems() {
        assert!(schema_problems(&record()).is_empty());

        let mut rec = record();
        rec.status = Availability::Unknown;
        rec.price_pln = Some(CellValue::from("n/a"));
        rec.fabric = None;
        assert_eq!(schema_problems(&rec), vec!["status", "fabric", "price_pln"]);
    }
}
