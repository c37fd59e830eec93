//! Cart and line item types.

use crate::catalog::CatalogRef;
use crate::error::CommerceError;
use crate::ids::{CartId, CartLineId, UserId};
use crate::money::{Currency, Money};
use crate::pricing::{PricingConfig, Totals};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 999;

/// A shopping cart, owned 1:1 by an account.
///
/// Carts are created lazily on first access and persist empty; they are
/// never hard-deleted. Derived totals are recomputed on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning account.
    pub owner_id: UserId,
    /// Ordered lines in the cart.
    pub lines: Vec<CartLine>,
    /// Derived totals, recomputed on every mutation.
    pub totals: Totals,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart for an account.
    pub fn new(owner_id: UserId, currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            owner_id,
            lines: Vec::new(),
            totals: Totals::zero(currency),
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an item to the cart, merging into an existing line for the
    /// same catalog item.
    ///
    /// The unit price is a snapshot taken at add time; later catalog
    /// price changes do not touch it.
    pub fn add_line(
        &mut self,
        item: CatalogRef,
        name: impl Into<String>,
        image: Option<String>,
        quantity: i64,
        unit_price: Money,
        config: &PricingConfig,
    ) -> Result<CartLineId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if !unit_price.is_positive() {
            return Err(CommerceError::InvalidAmount(unit_price.amount_minor));
        }

        if let Some(existing) = self.lines.iter_mut().find(|l| l.item == item) {
            let merged = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if merged > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::InvalidQuantity(merged));
            }
            existing.quantity = merged;
            let id = existing.id.clone();
            self.recalculate(config)?;
            return Ok(id);
        }

        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let line = CartLine {
            id: CartLineId::generate(),
            item,
            name: name.into(),
            image,
            quantity,
            unit_price,
        };
        let id = line.id.clone();
        self.lines.push(line);
        self.recalculate(config)?;
        Ok(id)
    }

    /// Update a line's quantity. A quantity of zero or less removes the
    /// line.
    pub fn update_quantity(
        &mut self,
        line_id: &CartLineId,
        quantity: i64,
        config: &PricingConfig,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return self.remove_line(line_id, config);
        }
        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| &l.id == line_id) {
            line.quantity = quantity;
            self.recalculate(config)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove a line from the cart.
    pub fn remove_line(
        &mut self,
        line_id: &CartLineId,
        config: &PricingConfig,
    ) -> Result<bool, CommerceError> {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.id != line_id);
        let removed = self.lines.len() < len_before;
        if removed {
            self.recalculate(config)?;
        }
        Ok(removed)
    }

    /// Consume a purchased quantity from a line without recomputing
    /// totals: the line is removed when fully purchased, shrunk
    /// otherwise.
    ///
    /// The caller recomputes totals once after consuming all purchased
    /// lines, then persists once.
    pub fn consume(&mut self, line_id: &CartLineId, quantity: i64) -> bool {
        let Some(index) = self.lines.iter().position(|l| &l.id == line_id) else {
            return false;
        };
        if self.lines[index].quantity <= quantity {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity -= quantity;
        }
        true
    }

    /// Recompute the derived totals.
    pub fn recalculate(&mut self, config: &PricingConfig) -> Result<(), CommerceError> {
        self.totals = Totals::for_cart(
            self.lines.iter().map(|l| (l.unit_price, l.quantity)),
            config,
        )?;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Get a line by ID.
    pub fn line(&self, line_id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == line_id)
    }

    /// Get a line by catalog item reference.
    pub fn line_by_item(&self, item: &CatalogRef) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.item == item)
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// A line in the cart: one chosen catalog item with a quantity and a
/// price snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Unique line identifier.
    pub id: CartLineId,
    /// Catalog item this line refers to.
    pub item: CatalogRef,
    /// Display name (denormalized snapshot).
    pub name: String,
    /// Image URL (denormalized snapshot).
    pub image: Option<String>,
    /// Quantity.
    pub quantity: i64,
    /// Unit price snapshot taken when the line was added.
    pub unit_price: Money,
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
