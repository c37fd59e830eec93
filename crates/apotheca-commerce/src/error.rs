//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in checkout and order operations.
///
/// Everything here is client-correctable and raised before any
/// persistence happens; once an order exists, later steps degrade to
/// logged warnings instead of errors.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Checkout selection was empty.
    #[error("At least one item must be selected for checkout")]
    ItemsRequired,

    /// Selection entry carried neither a line id nor an item reference.
    #[error("Selection entry requires a cart line id or an item kind and reference id")]
    IdentifierRequired,

    /// No cart line matched the selection entry.
    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),

    /// Two selection entries resolved to the same cart line.
    #[error("Duplicate selection for cart line: {0}")]
    DuplicateSelection(String),

    /// Requested quantity was zero or negative.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Requested quantity exceeds what the cart line holds.
    #[error("Requested quantity {requested} exceeds cart quantity {in_cart}")]
    QuantityExceedsCart { requested: i64, in_cart: i64 },

    /// Product is missing from the catalog or not active.
    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    /// Catalog stock cannot cover the requested quantity.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Computed amount was zero or negative.
    #[error("Invalid order amount: {0}")]
    InvalidAmount(i64),

    /// Cart holds no lines.
    #[error("Cart is empty")]
    CartEmpty,

    /// Linked prescription does not exist.
    #[error("Prescription not found: {0}")]
    PrescriptionNotFound(String),

    /// Linked prescription belongs to a different account.
    #[error("Prescription {0} does not belong to the caller")]
    PrescriptionUnauthorized(String),

    /// Caller's account is blocked from ordering.
    #[error("Account is blocked: {0}")]
    UserBlocked(String),

    /// Order not found (or not visible to the caller).
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Status transition rejected by the lifecycle rules.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Currency mismatch in money arithmetic.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}
