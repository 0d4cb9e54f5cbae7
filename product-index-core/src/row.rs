use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

/// A spreadsheet column the loader knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    State,
    Collection,
    Type,
    Price,
    Size,
    Fabric,
    Base,
    Id,
    Item,
    WebsiteDescription,
    /// Legacy availability column, consulted only when `State` is absent.
    Availability,
}

impl MetadataField {
    /// Every recognized field, in header-report order.
    pub const ALL: [MetadataField; 11] = [
        Self::State,
        Self::Collection,
        Self::Type,
        Self::Price,
        Self::Size,
        Self::Fabric,
        Self::Base,
        Self::Id,
        Self::Item,
        Self::WebsiteDescription,
        Self::Availability,
    ];

    /// Lowercase header names accepted for this field, most preferred first.
    ///
    /// "colection" is a spelling that exists in real product sheets.
    pub fn accepted_headers(&self) -> &'static [&'static str] {
        match self {
            Self::State => &["state"],
            Self::Collection => &["collection", "colection"],
            Self::Type => &["type"],
            Self::Price => &["price pln", "price"],
            Self::Size => &["size (eu)", "size"],
            Self::Fabric => &["fabric"],
            Self::Base => &["base"],
            Self::Id => &["id"],
            Self::Item => &["item"],
            Self::WebsiteDescription => &["website des", "websitedes", "website description"],
            Self::Availability => &["availability"],
        }
    }

    /// Canonical header as it appears in the product sheet.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::Collection => "Collection",
            Self::Type => "Type",
            Self::Price => "Price PLN",
            Self::Size => "Size (EU)",
            Self::Fabric => "Fabric",
            Self::Base => "Base",
            Self::Id => "ID",
            Self::Item => "Item",
            Self::WebsiteDescription => "Website Des",
            Self::Availability => "Availability",
        }
    }

    /// Match a raw header cell (case-insensitive, whitespace-trimmed).
    ///
    /// Returns the field and the header's rank within
    /// [`accepted_headers`](Self::accepted_headers), 0 being preferred.
    pub fn from_header(header: &str) -> Option<(Self, usize)> {
        let lower = header.trim().to_lowercase();
        Self::ALL.iter().find_map(|field| {
            field
                .accepted_headers()
                .iter()
                .position(|h| *h == lower)
                .map(|rank| (*field, rank))
        })
    }
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One spreadsheet record describing a product.
///
/// Every field except `item` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    /// Product display name as written in the sheet (trimmed).
    pub item: String,
    pub id: Option<CellValue>,
    /// Raw inventory text, e.g. "IN STOCK" or "SOLD OUT".
    pub state: Option<CellValue>,
    pub collection: Option<CellValue>,
    #[serde(rename = "type")]
    pub kind: Option<CellValue>,
    pub price: Option<CellValue>,
    pub size: Option<CellValue>,
    pub fabric: Option<CellValue>,
    pub base: Option<CellValue>,
    pub website_description: Option<CellValue>,
    pub availability: Option<CellValue>,
}

impl MetadataRow {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ..Self::default()
        }
    }

    /// Mutable slot for a field. `Item` has no optional slot and returns `None`.
    pub fn slot_mut(&mut self, field: MetadataField) -> Option<&mut Option<CellValue>> {
        match field {
            MetadataField::State => Some(&mut self.state),
            MetadataField::Collection => Some(&mut self.collection),
            MetadataField::Type => Some(&mut self.kind),
            MetadataField::Price => Some(&mut self.price),
            MetadataField::Size => Some(&mut self.size),
            MetadataField::Fabric => Some(&mut self.fabric),
            MetadataField::Base => Some(&mut self.base),
            MetadataField::Id => Some(&mut self.id),
            MetadataField::WebsiteDescription => Some(&mut self.website_description),
            MetadataField::Availability => Some(&mut self.availability),
            MetadataField::Item => None,
        }
    }

    /// The ID rendered for composite keys and disambiguation, if present.
    pub fn normalized_id(&self) -> Option<String> {
        self.id.as_ref().map(CellValue::key_string)
    }

    /// Composite `"<ID> <Item>"` lookup key, if the row has an ID.
    pub fn composite_key(&self) -> Option<String> {
        self.normalized_id().map(|id| format!("{} {}", id, self.item))
    }

    pub fn with_id(mut self, id: impl Into<CellValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<CellValue>) -> Self {
        self.state = Some(state.into());
        self
    }
}
