//! Persistence seams for the Apotheca checkout core.
//!
//! Each collaborator the checkout service talks to sits behind an async
//! trait, so the in-memory reference stores in [`memory`] and a real
//! database backend are interchangeable. The one operation with real
//! semantics here is [`CatalogStore::decrement_stock`]: it must be a
//! single atomic, stock-conditioned write, because checkout correctness
//! under concurrency rests on it rather than on the earlier validation
//! read.

pub mod error;
pub mod memory;

pub use error::StoreError;

use apotheca_commerce::cart::Cart;
use apotheca_commerce::catalog::Product;
use apotheca_commerce::checkout::Order;
use apotheca_commerce::ids::{OrderId, PrescriptionId, ProductId, UserId};
use apotheca_commerce::prescription::{Prescription, PrescriptionStatus};
use async_trait::async_trait;

/// Cart persistence: read by owner, full replace on save.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the owner's cart, if one exists yet.
    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Cart>, StoreError>;

    /// Persist the cart, replacing any previous version (last write
    /// wins).
    async fn save(&self, cart: &Cart) -> Result<(), StoreError>;
}

/// Catalog reads plus the guarded stock decrement.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load a product by id.
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Persist a product (non-concurrent fields only).
    async fn save_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Atomically decrement stock by `quantity` only if at least that
    /// much remains.
    ///
    /// Returns `Ok(false)` when stock was insufficient at commit time;
    /// the caller decides what to do with the shortfall.
    async fn decrement_stock(&self, id: &ProductId, quantity: i64) -> Result<bool, StoreError>;
}

/// Order persistence with a monotonic number counter.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch the next value of the monotonic order-number counter.
    async fn next_order_number(&self) -> Result<u64, StoreError>;

    /// Insert a new order; fails with `Conflict` when the order number
    /// is already taken.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Persist changes to an existing order.
    async fn save(&self, order: &Order) -> Result<(), StoreError>;

    /// Load an order by id.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// List an account's orders, most recent first.
    async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Order>, StoreError>;
}

/// The prescription-fulfillment workflow, as this core consumes it.
#[async_trait]
pub trait PrescriptionGateway: Send + Sync {
    /// Load a prescription by id.
    async fn get(&self, id: &PrescriptionId) -> Result<Option<Prescription>, StoreError>;

    /// Apply a status transition to the prescription workflow.
    async fn transition(
        &self,
        id: &PrescriptionId,
        status: PrescriptionStatus,
        actor: &UserId,
        note: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// The slice of the identity layer checkout needs: the blocked flag.
#[async_trait]
pub trait AccountGate: Send + Sync {
    /// Check whether the account is blocked from ordering.
    async fn is_blocked(&self, user_id: &UserId) -> Result<bool, StoreError>;
}
