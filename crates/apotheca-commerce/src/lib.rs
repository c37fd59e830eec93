//! Pharmacy commerce domain types and logic for Apotheca.
//!
//! This crate provides the order-fulfillment core of a pharmacy backend:
//!
//! - **Catalog**: products with price, stock and availability
//! - **Cart**: per-account cart with line items and derived totals
//! - **Checkout**: selective-checkout resolution, pricing, orders and
//!   the order status lifecycle
//! - **Prescription**: the optional prescription-fulfillment linkage
//!
//! Everything here is pure domain logic; persistence lives behind the
//! store traits in `apotheca-store` and orchestration in
//! `apotheca-checkout`.

pub mod error;
pub mod ids;
pub mod money;
pub mod pricing;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod prescription;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::pricing::{PricingConfig, Totals};

    // Catalog
    pub use crate::catalog::{CatalogRef, ItemKind, Product};

    // Cart
    pub use crate::cart::{Cart, CartLine};

    // Checkout
    pub use crate::checkout::{
        LineTarget, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus, ResolvedLine,
        SelectionEntry, SelectionInput, ShippingAddress, StatusEntry,
    };

    // Prescription
    pub use crate::prescription::{Prescription, PrescriptionStatus};
}
