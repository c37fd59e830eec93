//! Product catalog read model.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// The checkout core only reads price, stock and the active flag; stock
/// writes go through the store's conditional decrement, never through
/// this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Stock keeping unit.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Full description.
    pub description: Option<String>,
    /// Primary image URL.
    pub image: Option<String>,
    /// Current unit price.
    pub price: Money,
    /// Sellable units on hand.
    pub stock: i64,
    /// Whether the product is visible and sellable.
    pub active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new active product.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            sku: sku.into(),
            name: name.into(),
            description: None,
            image: None,
            price,
            stock,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the product can be sold at all.
    pub fn is_sellable(&self) -> bool {
        self.active
    }

    /// Check if a specific quantity is in stock.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Add inventory (restock).
    pub fn restock(&mut self, quantity: i64) {
        self.stock += quantity;
        self.updated_at = current_timestamp();
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_product_fulfillment() {
        let product = Product::new("PARA-500", "Paracetamol 500mg", Money::new(2500, Currency::INR), 10);
        assert!(product.is_sellable());
        assert!(product.can_fulfill(10));
        assert!(!product.can_fulfill(11));
    }

    #[test]
    fn test_inactive_product_not_sellable() {
        let mut product = Product::new("VITC-100", "Vitamin C", Money::new(1000, Currency::INR), 5);
        product.active = false;
        assert!(!product.is_sellable());
    }

    #[test]
    fn test_restock() {
        let mut product = Product::new("BAND-10", "Bandages", Money::new(500, Currency::INR), 2);
        product.restock(8);
        assert_eq!(product.stock, 10);
    }
}
