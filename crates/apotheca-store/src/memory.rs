//! In-memory reference implementations of the store traits.
//!
//! Backed by `tokio::sync::RwLock` maps. The conditional stock
//! decrement runs under a single write lock, which gives it the same
//! atomicity a database's guarded `UPDATE ... WHERE stock >= n` would.

use crate::error::StoreError;
use crate::{AccountGate, CartStore, CatalogStore, OrderStore, PrescriptionGateway};
use apotheca_commerce::cart::Cart;
use apotheca_commerce::catalog::Product;
use apotheca_commerce::checkout::Order;
use apotheca_commerce::ids::{OrderId, PrescriptionId, ProductId, UserId};
use apotheca_commerce::prescription::{Prescription, PrescriptionStatus};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory cart store, keyed by owner.
#[derive(Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts.read().await.get(owner_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        self.carts
            .write()
            .await
            .insert(cart.owner_id.clone(), cart.clone());
        Ok(())
    }
}

/// In-memory catalog store.
#[derive(Default)]
pub struct MemoryCatalogStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product into the catalog.
    pub async fn insert(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn save_product(&self, product: &Product) -> Result<(), StoreError> {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn decrement_stock(&self, id: &ProductId, quantity: i64) -> Result<bool, StoreError> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if product.stock < quantity {
            return Ok(false);
        }
        product.stock -= quantity;
        Ok(true)
    }
}

/// In-memory order store with a seedable monotonic counter.
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    numbers: RwLock<HashSet<String>>,
    counter: AtomicU64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::with_counter(1000)
    }

    /// Start the order-number counter at a given value.
    pub fn with_counter(start: u64) -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            numbers: RwLock::new(HashSet::new()),
            counter: AtomicU64::new(start),
        }
    }

    /// Rewind the counter, e.g. to simulate a stale replica handing out
    /// an already-used number.
    pub fn set_counter(&self, value: u64) {
        self.counter.store(value, Ordering::SeqCst);
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn next_order_number(&self) -> Result<u64, StoreError> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut numbers = self.numbers.write().await;
        if !numbers.insert(order.order_number.clone()) {
            return Err(StoreError::Conflict(format!(
                "order number already taken: {}",
                order.order_number
            )));
        }
        self.orders
            .write()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(StoreError::NotFound(order.id.to_string()));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| &o.owner_id == owner_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

/// In-memory prescription workflow.
#[derive(Default)]
pub struct MemoryPrescriptionStore {
    prescriptions: RwLock<HashMap<PrescriptionId, Prescription>>,
}

impl MemoryPrescriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a prescription.
    pub async fn insert(&self, prescription: Prescription) {
        self.prescriptions
            .write()
            .await
            .insert(prescription.id.clone(), prescription);
    }

    /// Read back a prescription's current status.
    pub async fn status_of(&self, id: &PrescriptionId) -> Option<PrescriptionStatus> {
        self.prescriptions.read().await.get(id).map(|p| p.status)
    }
}

#[async_trait]
impl PrescriptionGateway for MemoryPrescriptionStore {
    async fn get(&self, id: &PrescriptionId) -> Result<Option<Prescription>, StoreError> {
        Ok(self.prescriptions.read().await.get(id).cloned())
    }

    async fn transition(
        &self,
        id: &PrescriptionId,
        status: PrescriptionStatus,
        _actor: &UserId,
        _note: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut prescriptions = self.prescriptions.write().await;
        let prescription = prescriptions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        prescription.status = status;
        Ok(())
    }
}

/// In-memory account gate: a set of blocked account ids.
#[derive(Default)]
pub struct MemoryAccountGate {
    blocked: RwLock<HashSet<UserId>>,
}

impl MemoryAccountGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block an account.
    pub async fn block(&self, user_id: UserId) {
        self.blocked.write().await.insert(user_id);
    }
}

#[async_trait]
impl AccountGate for MemoryAccountGate {
    async fn is_blocked(&self, user_id: &UserId) -> Result<bool, StoreError> {
        Ok(self.blocked.read().await.contains(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_commerce::money::{Currency, Money};

    fn product(stock: i64) -> Product {
        Product::new("PARA-500", "Paracetamol 500mg", Money::new(100, Currency::INR), stock)
    }

    #[tokio::test]
    async fn test_decrement_stock_applies_when_sufficient() {
        let store = MemoryCatalogStore::new();
        let p = product(5);
        let id = p.id.clone();
        store.insert(p).await;

        assert!(store.decrement_stock(&id, 3).await.unwrap());
        assert_eq!(store.product(&id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_decrement_stock_refuses_when_short() {
        let store = MemoryCatalogStore::new();
        let p = product(2);
        let id = p.id.clone();
        store.insert(p).await;

        assert!(!store.decrement_stock(&id, 3).await.unwrap());
        // Stock untouched on refusal.
        assert_eq!(store.product(&id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_decrement_stock_unknown_product() {
        let store = MemoryCatalogStore::new();
        let err = store
            .decrement_stock(&ProductId::new("missing"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_order_number_counter_is_monotonic() {
        let store = MemoryOrderStore::with_counter(100);
        assert_eq!(store.next_order_number().await.unwrap(), 101);
        assert_eq!(store.next_order_number().await.unwrap(), 102);
    }

    #[tokio::test]
    async fn test_account_gate() {
        let gate = MemoryAccountGate::new();
        let user = UserId::new("user-1");
        assert!(!gate.is_blocked(&user).await.unwrap());
        gate.block(user.clone()).await;
        assert!(gate.is_blocked(&user).await.unwrap());
    }
}
