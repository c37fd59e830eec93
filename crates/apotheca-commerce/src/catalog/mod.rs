//! Catalog types: products and catalog item references.

mod product;

pub use product::Product;

use crate::ids::{MedicineId, ProductId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of catalog item a cart line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Over-the-counter product with authoritative stock.
    Product,
    /// Medicine from the prescription catalog; no stock tracking.
    Medicine,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Medicine => "medicine",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "product" => Some(ItemKind::Product),
            "medicine" => Some(ItemKind::Medicine),
            _ => None,
        }
    }
}

/// A typed reference to a catalog item.
///
/// Medicine-kind references have no authoritative inventory source, so
/// the stock guard only applies to product-kind references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum CatalogRef {
    Product(ProductId),
    Medicine(MedicineId),
}

impl CatalogRef {
    /// The kind discriminant of this reference.
    pub fn kind(&self) -> ItemKind {
        match self {
            CatalogRef::Product(_) => ItemKind::Product,
            CatalogRef::Medicine(_) => ItemKind::Medicine,
        }
    }

    /// The raw reference id.
    pub fn reference_id(&self) -> &str {
        match self {
            CatalogRef::Product(id) => id.as_str(),
            CatalogRef::Medicine(id) => id.as_str(),
        }
    }
}

impl fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.reference_id())
    }
}
