//! Selective-checkout resolution.
//!
//! A checkout request names a subset of cart lines, each with an
//! optional partial quantity. Resolution is all-or-nothing: any invalid
//! entry fails the whole selection before anything is persisted.

use crate::cart::{Cart, CartLine};
use crate::catalog::{CatalogRef, ItemKind};
use crate::error::CommerceError;
use crate::ids::{CartLineId, MedicineId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How a selection entry points at a cart line: directly by line id, or
/// by the catalog item the line holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineTarget {
    /// Direct cart line identifier.
    Line(CartLineId),
    /// Fallback: item kind plus reference id.
    Item(CatalogRef),
}

impl LineTarget {
    /// Check whether a cart line matches this target.
    pub fn matches(&self, line: &CartLine) -> bool {
        match self {
            LineTarget::Line(id) => &line.id == id,
            LineTarget::Item(item) => &line.item == item,
        }
    }
}

impl fmt::Display for LineTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineTarget::Line(id) => write!(f, "line {}", id),
            LineTarget::Item(item) => write!(f, "{}", item),
        }
    }
}

/// A validated selection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// The cart line this entry targets.
    pub target: LineTarget,
    /// Quantity to purchase; defaults to the full line quantity.
    pub quantity: Option<i64>,
}

/// Raw selection entry as received from the transport layer.
///
/// Either `line_id` or both `kind` and `reference_id` must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionInput {
    /// Direct cart line id.
    #[serde(default)]
    pub line_id: Option<CartLineId>,
    /// Item kind for the fallback match.
    #[serde(default)]
    pub kind: Option<ItemKind>,
    /// Catalog reference id for the fallback match.
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Quantity to purchase.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl SelectionInput {
    /// Validate the raw entry into a typed one.
    pub fn into_entry(self) -> Result<SelectionEntry, CommerceError> {
        let target = if let Some(line_id) = self.line_id {
            LineTarget::Line(line_id)
        } else {
            match (self.kind, self.reference_id) {
                (Some(ItemKind::Product), Some(id)) => {
                    LineTarget::Item(CatalogRef::Product(ProductId::new(id)))
                }
                (Some(ItemKind::Medicine), Some(id)) => {
                    LineTarget::Item(CatalogRef::Medicine(MedicineId::new(id)))
                }
                _ => return Err(CommerceError::IdentifierRequired),
            }
        };
        Ok(SelectionEntry {
            target,
            quantity: self.quantity,
        })
    }
}

/// Normalize a raw selection into typed entries.
///
/// Fails with `ItemsRequired` on an empty selection and
/// `IdentifierRequired` on an entry with no usable identifier.
pub fn normalize_selection(
    inputs: Vec<SelectionInput>,
) -> Result<Vec<SelectionEntry>, CommerceError> {
    if inputs.is_empty() {
        return Err(CommerceError::ItemsRequired);
    }
    inputs.into_iter().map(SelectionInput::into_entry).collect()
}

/// A cart line bound to a validated purchase quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// The cart line being purchased.
    pub line_id: CartLineId,
    /// Catalog item reference.
    pub item: CatalogRef,
    /// Display name snapshot.
    pub name: String,
    /// Image snapshot.
    pub image: Option<String>,
    /// Validated purchase quantity.
    pub quantity: i64,
    /// Unit price snapshot from the cart line.
    pub unit_price: Money,
}

/// Resolve a selection against a cart.
///
/// Matching tries the direct line id first, then the (kind, reference)
/// fallback. Each cart line may be targeted at most once per call.
/// Purely read-validate; no side effects.
pub fn resolve_selection(
    cart: &Cart,
    entries: &[SelectionEntry],
) -> Result<Vec<ResolvedLine>, CommerceError> {
    if cart.is_empty() {
        return Err(CommerceError::CartEmpty);
    }
    if entries.is_empty() {
        return Err(CommerceError::ItemsRequired);
    }

    let mut seen: HashSet<CartLineId> = HashSet::new();
    let mut resolved = Vec::with_capacity(entries.len());

    for entry in entries {
        let line = cart
            .lines
            .iter()
            .find(|l| entry.target.matches(l))
            .ok_or_else(|| CommerceError::ItemNotFound(entry.target.to_string()))?;

        if !seen.insert(line.id.clone()) {
            return Err(CommerceError::DuplicateSelection(line.id.to_string()));
        }

        let quantity = entry.quantity.unwrap_or(line.quantity);
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if quantity > line.quantity {
            return Err(CommerceError::QuantityExceedsCart {
                requested: quantity,
                in_cart: line.quantity,
            });
        }

        resolved.push(ResolvedLine {
            line_id: line.id.clone(),
            item: line.item.clone(),
            name: line.name.clone(),
            image: line.image.clone(),
            quantity,
            unit_price: line.unit_price,
        });
    }

    Ok(resolved)
}
