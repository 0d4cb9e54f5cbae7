//! Product folder names.
//!
//! Folders under the `Items` root are named either after the product
//! ("Dusty Plate Pants") or after an ID and the product separated by a
//! single space ("10 Dusty Plate Pants").

use crate::cell::CellValue;

/// A product folder name split into its optional ID prefix and clean item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFolder {
    /// Full directory name as listed on disk.
    pub name: String,
    /// Leading run of ASCII digits, when the name has the `"<digits> <item>"` shape.
    pub id_prefix: Option<String>,
    /// Name with the ID prefix removed.
    pub item: String,
}

impl ProductFolder {
    /// Split a directory name into ID prefix and item name.
    ///
    /// # Examples
    ///
    /// ```
    /// use product_index_core::ProductFolder;
    ///
    /// let folder = ProductFolder::parse("10 Dusty Plate Pants");
    /// assert_eq!(folder.id_prefix.as_deref(), Some("10"));
    /// assert_eq!(folder.item, "Dusty Plate Pants");
    ///
    /// let folder = ProductFolder::parse("Ring");
    /// assert_eq!(folder.id_prefix, None);
    /// assert_eq!(folder.item, "Ring");
    /// ```
    pub fn parse(name: &str) -> Self {
        if let Some((head, rest)) = name.split_once(' ') {
            if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) {
                return Self {
                    name: name.to_string(),
                    id_prefix: Some(head.to_string()),
                    item: rest.to_string(),
                };
            }
        }
        Self {
            name: name.to_string(),
            id_prefix: None,
            item: name.to_string(),
        }
    }

    /// The folder's ID as a cell value: an integer when it fits, otherwise
    /// the raw digit string.
    pub fn id_value(&self) -> Option<CellValue> {
        self.id_prefix.as_ref().map(|prefix| match prefix.parse::<i64>() {
            Ok(n) => CellValue::Int(n),
            Err(_) => CellValue::Text(prefix.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_numeric_prefix() {
        let f = ProductFolder::parse("10 Dusty Plate Pants");
        assert_eq!(f.name, "10 Dusty Plate Pants");
        assert_eq!(f.id_prefix.as_deref(), Some("10"));
        assert_eq!(f.item, "Dusty Plate Pants");
        assert_eq!(f.id_value(), Some(CellValue::Int(10)));
    }

    #[test]
    fn non_numeric_prefix_is_part_of_the_name() {
        let f = ProductFolder::parse("A10 Dusty Plate Pants");
        assert_eq!(f.id_prefix, None);
        assert_eq!(f.item, "A10 Dusty Plate Pants");
        assert_eq!(f.id_value(), None);
    }

    #[test]
    fn bare_number_has_no_item_split() {
        let f = ProductFolder::parse("10");
        assert_eq!(f.id_prefix, None);
        assert_eq!(f.item, "10");
    }

    #[test]
    fn oversized_prefix_stays_text() {
        let f = ProductFolder::parse("99999999999999999999999 Coat");
        assert_eq!(
            f.id_value(),
            Some(CellValue::Text("99999999999999999999999".to_string()))
        );
        assert_eq!(f.item, "Coat");
    }

    #[test]
    fn only_first_space_splits() {
        let f = ProductFolder::parse("3 Rusty  Oil Jacket");
        assert_eq!(f.item, "Rusty  Oil Jacket");
    }
}
