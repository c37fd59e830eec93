//! The checkout service: selective checkout, order queries and the
//! status lifecycle, wired through the store traits.

use crate::error::CheckoutError;
use apotheca_commerce::cart::Cart;
use apotheca_commerce::checkout::{
    normalize_selection, resolve_selection, Order, OrderLine, OrderStatus, PaymentMethod,
    ResolvedLine, SelectionInput, ShippingAddress,
};
use apotheca_commerce::catalog::CatalogRef;
use apotheca_commerce::ids::{CartId, OrderId, PrescriptionId, ProductId, UserId};
use apotheca_commerce::prescription::PrescriptionStatus;
use apotheca_commerce::pricing::{PricingConfig, Totals};
use apotheca_commerce::CommerceError;
use apotheca_store::{
    AccountGate, CartStore, CatalogStore, OrderStore, PrescriptionGateway, StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Attempts at assigning a unique order number before giving up.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// A checkout request: which cart lines to purchase, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Where to deliver.
    pub shipping_address: ShippingAddress,
    /// How the customer intends to pay.
    pub payment_method: PaymentMethod,
    /// Which cart lines to purchase.
    pub selection: Vec<SelectionInput>,
    /// Prescription this purchase fulfills, if any.
    pub prescription_id: Option<PrescriptionId>,
}

/// A post-commit step that failed after the order was durably created.
///
/// These never unwind the order; they are an operator reconciliation
/// duty.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PostCommitIssue {
    #[error("stock for {product_id} was not decremented by {quantity}")]
    StockNotDecremented { product_id: ProductId, quantity: i64 },

    #[error("cart {cart_id} was not reconciled")]
    CartNotReconciled { cart_id: CartId },

    #[error("prescription {prescription_id} status was not updated")]
    PrescriptionNotUpdated { prescription_id: PrescriptionId },
}

/// The result of a successful checkout: the durable order plus any
/// best-effort steps that failed after it was created.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The persisted order.
    pub order: Order,
    /// Post-commit failures needing operational reconciliation.
    pub issues: Vec<PostCommitIssue>,
}

/// Narrow fulfillment-field update for an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FulfillmentUpdate {
    /// Courier tracking number.
    pub tracking_number: Option<String>,
    /// Expected or actual delivery date.
    pub delivery_date: Option<i64>,
    /// Operator assigned to the order.
    pub assigned_to: Option<UserId>,
}

/// Orchestrates checkout and the order lifecycle.
pub struct CheckoutService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    prescriptions: Arc<dyn PrescriptionGateway>,
    accounts: Arc<dyn AccountGate>,
    pricing: PricingConfig,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        prescriptions: Arc<dyn PrescriptionGateway>,
        accounts: Arc<dyn AccountGate>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            carts,
            catalog,
            orders,
            prescriptions,
            accounts,
            pricing,
        }
    }

    /// Convert a selection of the caller's cart lines into a durable
    /// order.
    ///
    /// Validation failures abort before anything is persisted. Once the
    /// order is inserted, the remaining steps (stock decrement, cart
    /// reconciliation, prescription propagation) are best-effort:
    /// failures are logged and reported on the outcome, never rolled
    /// back.
    pub async fn checkout(
        &self,
        owner_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self.accounts.is_blocked(owner_id).await? {
            return Err(CommerceError::UserBlocked(owner_id.to_string()).into());
        }

        let mut cart = self
            .carts
            .find_by_owner(owner_id)
            .await?
            .ok_or(CommerceError::CartEmpty)?;
        if cart.is_empty() {
            return Err(CommerceError::CartEmpty.into());
        }

        let entries = normalize_selection(request.selection)?;
        let resolved = resolve_selection(&cart, &entries)?;

        self.guard_stock(&resolved).await?;

        if let Some(prescription_id) = &request.prescription_id {
            self.verify_prescription(owner_id, prescription_id).await?;
        }

        let totals = Totals::quote(
            resolved.iter().map(|l| (l.unit_price, l.quantity)),
            &self.pricing,
        )?;
        let lines = resolved
            .iter()
            .map(OrderLine::from_resolved)
            .collect::<Result<Vec<_>, _>>()?;

        // The order is persisted before any inventory mutation: a
        // visible purchase record outlives a transient stock or cart
        // inconsistency, never the other way around.
        let order = self
            .persist_order(
                owner_id,
                lines,
                totals,
                request.shipping_address,
                request.payment_method,
                request.prescription_id,
            )
            .await?;

        let mut issues = Vec::new();
        self.commit_inventory(&resolved, &order, &mut issues).await;
        self.reconcile_cart(&mut cart, &resolved, &order, &mut issues)
            .await;
        self.propagate_prescription(&order, order.status, owner_id, None, &mut issues)
            .await;

        info!(
            order_number = %order.order_number,
            owner = %owner_id,
            items = order.lines.len(),
            total = order.totals.total.amount_minor,
            "checkout completed"
        );
        Ok(CheckoutOutcome { order, issues })
    }

    /// List the caller's orders, most recent first.
    pub async fn list_orders(&self, owner_id: &UserId) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_by_owner(owner_id).await?)
    }

    /// Fetch one of the caller's orders. A foreign order reads as not
    /// found rather than leaking its existence.
    pub async fn get_order(
        &self,
        owner_id: &UserId,
        order_id: &OrderId,
    ) -> Result<Order, CheckoutError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .filter(|o| &o.owner_id == owner_id)
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;
        Ok(order)
    }

    /// Apply a lifecycle transition to an order.
    ///
    /// The linked prescription, if any, receives a mapped status
    /// transition best-effort; its failure never blocks or reverses the
    /// order's own transition.
    pub async fn transition_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        actor: &UserId,
        note: Option<String>,
    ) -> Result<Order, CheckoutError> {
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

        order.transition(status, actor.clone(), note.clone())?;
        self.orders.save(&order).await?;

        let mut issues = Vec::new();
        self.propagate_prescription(&order, status, actor, note.as_deref(), &mut issues)
            .await;

        info!(
            order_number = %order.order_number,
            status = status.as_str(),
            actor = %actor,
            "order status transitioned"
        );
        Ok(order)
    }

    /// Update an order's narrow fulfillment fields.
    pub async fn update_fulfillment(
        &self,
        order_id: &OrderId,
        update: FulfillmentUpdate,
    ) -> Result<Order, CheckoutError> {
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

        if let Some(tracking) = update.tracking_number {
            order.set_tracking_number(tracking);
        }
        if let Some(at) = update.delivery_date {
            order.set_delivery_date(at);
        }
        if let Some(operator) = update.assigned_to {
            order.assign_to(operator);
        }
        self.orders.save(&order).await?;
        Ok(order)
    }

    /// Validate sellable inventory for every product-kind line.
    ///
    /// Each product is fetched once per call, even when several entries
    /// reference it. Medicine-kind lines carry no authoritative
    /// inventory and skip the guard.
    async fn guard_stock(&self, resolved: &[ResolvedLine]) -> Result<(), CheckoutError> {
        let mut wanted: Vec<(ProductId, i64)> = Vec::new();
        for line in resolved {
            let CatalogRef::Product(product_id) = &line.item else {
                continue;
            };
            match wanted.iter_mut().find(|(id, _)| id == product_id) {
                Some((_, quantity)) => *quantity += line.quantity,
                None => wanted.push((product_id.clone(), line.quantity)),
            }
        }

        for (product_id, quantity) in &wanted {
            let product = self
                .catalog
                .product(product_id)
                .await?
                .ok_or_else(|| CommerceError::ProductUnavailable(product_id.to_string()))?;
            if !product.is_sellable() {
                return Err(CommerceError::ProductUnavailable(product_id.to_string()).into());
            }
            if !product.can_fulfill(*quantity) {
                return Err(CommerceError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: *quantity,
                    available: product.stock,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Check the linked prescription exists and belongs to the caller.
    async fn verify_prescription(
        &self,
        owner_id: &UserId,
        prescription_id: &PrescriptionId,
    ) -> Result<(), CheckoutError> {
        let prescription = self
            .prescriptions
            .get(prescription_id)
            .await?
            .ok_or_else(|| CommerceError::PrescriptionNotFound(prescription_id.to_string()))?;
        if &prescription.owner_id != owner_id {
            return Err(
                CommerceError::PrescriptionUnauthorized(prescription_id.to_string()).into(),
            );
        }
        Ok(())
    }

    /// Build and insert the order, retrying number assignment on a
    /// stale-counter collision.
    async fn persist_order(
        &self,
        owner_id: &UserId,
        lines: Vec<OrderLine>,
        totals: Totals,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        prescription_id: Option<PrescriptionId>,
    ) -> Result<Order, CheckoutError> {
        let mut attempt = 0;
        loop {
            let number = format!("PH-{}", self.orders.next_order_number().await?);
            let order = Order::create(
                number,
                owner_id.clone(),
                lines.clone(),
                totals.clone(),
                shipping_address.clone(),
                payment_method,
                prescription_id.clone(),
            )?;
            match self.orders.insert(&order).await {
                Ok(()) => return Ok(order),
                Err(StoreError::Conflict(reason)) if attempt + 1 < ORDER_NUMBER_ATTEMPTS => {
                    attempt += 1;
                    warn!(%reason, attempt, "order number collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Decrement catalog stock for each purchased product line.
    async fn commit_inventory(
        &self,
        resolved: &[ResolvedLine],
        order: &Order,
        issues: &mut Vec<PostCommitIssue>,
    ) {
        for line in resolved {
            let CatalogRef::Product(product_id) = &line.item else {
                continue;
            };
            match self.catalog.decrement_stock(product_id, line.quantity).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        order_number = %order.order_number,
                        product = %product_id,
                        quantity = line.quantity,
                        "stock consumed concurrently, decrement skipped"
                    );
                    issues.push(PostCommitIssue::StockNotDecremented {
                        product_id: product_id.clone(),
                        quantity: line.quantity,
                    });
                }
                Err(err) => {
                    warn!(
                        %err,
                        order_number = %order.order_number,
                        product = %product_id,
                        "stock decrement failed"
                    );
                    issues.push(PostCommitIssue::StockNotDecremented {
                        product_id: product_id.clone(),
                        quantity: line.quantity,
                    });
                }
            }
        }
    }

    /// Remove or shrink the purchased cart lines, then recompute and
    /// persist the cart once.
    async fn reconcile_cart(
        &self,
        cart: &mut Cart,
        resolved: &[ResolvedLine],
        order: &Order,
        issues: &mut Vec<PostCommitIssue>,
    ) {
        for line in resolved {
            cart.consume(&line.line_id, line.quantity);
        }
        let result = cart
            .recalculate(&self.pricing)
            .map_err(CheckoutError::from);
        let result = match result {
            Ok(()) => self.carts.save(cart).await.map_err(CheckoutError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            warn!(
                %err,
                order_number = %order.order_number,
                cart = %cart.id,
                "cart reconciliation failed"
            );
            issues.push(PostCommitIssue::CartNotReconciled {
                cart_id: cart.id.clone(),
            });
        }
    }

    /// Propagate a mapped status to the linked prescription workflow.
    async fn propagate_prescription(
        &self,
        order: &Order,
        status: OrderStatus,
        actor: &UserId,
        note: Option<&str>,
        issues: &mut Vec<PostCommitIssue>,
    ) {
        let Some(prescription_id) = &order.prescription_id else {
            return;
        };
        let mapped = PrescriptionStatus::for_order(status);
        if let Err(err) = self
            .prescriptions
            .transition(prescription_id, mapped, actor, note)
            .await
        {
            warn!(
                %err,
                order_number = %order.order_number,
                prescription = %prescription_id,
                status = mapped.as_str(),
                "prescription status propagation failed"
            );
            issues.push(PostCommitIssue::PrescriptionNotUpdated {
                prescription_id: prescription_id.clone(),
            });
        }
    }
}
