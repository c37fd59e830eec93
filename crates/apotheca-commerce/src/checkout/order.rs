//! Order types and the status lifecycle.

use crate::catalog::CatalogRef;
use crate::checkout::selection::ResolvedLine;
use crate::checkout::ShippingAddress;
use crate::error::CommerceError;
use crate::ids::{OrderId, PrescriptionId, UserId};
use crate::money::Money;
use crate::pricing::Totals;
use serde::{Deserialize, Serialize};

/// Order status.
///
/// `Processing` is the initial state; `Confirmed` and `OutForDelivery`
/// are in-fulfillment states; `Delivered` and `Cancelled` are terminal.
/// Beyond terminality the machine does not enforce a forward-only
/// order, so operators can correct a mis-set status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Order placed and being prepared.
    #[default]
    Processing,
    /// Order confirmed by the pharmacy.
    Confirmed,
    /// Order handed to delivery.
    OutForDelivery,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "processing" => Some(OrderStatus::Processing),
            "confirmed" => Some(OrderStatus::Confirmed),
            "out-for-delivery" => Some(OrderStatus::OutForDelivery),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if an order in this state can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    Card,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

/// Payment status. Recorded, not executed; gateway processing is an
/// external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// One entry in an order's append-only status history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEntry {
    /// Status set by this transition.
    pub status: OrderStatus,
    /// Who performed the transition.
    pub actor: UserId,
    /// Optional operator note.
    pub note: Option<String>,
    /// Unix timestamp of the transition.
    pub at: i64,
}

/// A line in an order: an immutable snapshot captured at purchase time,
/// decoupled from later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Catalog item reference.
    pub item: CatalogRef,
    /// Name at time of purchase.
    pub name: String,
    /// Image at time of purchase.
    pub image: Option<String>,
    /// Quantity purchased.
    pub quantity: i64,
    /// Unit price at time of purchase.
    pub unit_price: Money,
    /// Total price for this line.
    pub total_price: Money,
}

impl OrderLine {
    /// Snapshot a resolved cart line.
    pub fn from_resolved(line: &ResolvedLine) -> Result<Self, CommerceError> {
        let total_price = line
            .unit_price
            .try_multiply(line.quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            item: line.item.clone(),
            name: line.name.clone(),
            image: line.image.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price,
        })
    }
}

/// A durable purchase order.
///
/// Created once per successful checkout and never deleted; cancellation
/// is a terminal status, not removal. Mutated only via status
/// transitions and the narrow fulfillment fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable, unique order number.
    pub order_number: String,
    /// Owning account.
    pub owner_id: UserId,
    /// Immutable purchase snapshot; never empty.
    pub lines: Vec<OrderLine>,
    /// Computed totals at purchase time.
    pub totals: Totals,
    /// Shipping address snapshot.
    pub shipping_address: ShippingAddress,
    /// Payment method chosen at checkout.
    pub payment_method: PaymentMethod,
    /// Recorded payment status.
    pub payment_status: PaymentStatus,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Append-only transition history.
    pub status_history: Vec<StatusEntry>,
    /// Linked prescription, if the purchase fulfills one.
    pub prescription_id: Option<PrescriptionId>,
    /// Courier tracking number.
    pub tracking_number: Option<String>,
    /// Unix timestamp of delivery, once known.
    pub delivery_date: Option<i64>,
    /// Operator assigned to fulfill the order.
    pub assigned_to: Option<UserId>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Order {
    /// Build a new order in `Processing` status with a seeded history
    /// entry.
    pub fn create(
        order_number: impl Into<String>,
        owner_id: UserId,
        lines: Vec<OrderLine>,
        totals: Totals,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        prescription_id: Option<PrescriptionId>,
    ) -> Result<Self, CommerceError> {
        if lines.is_empty() {
            return Err(CommerceError::ItemsRequired);
        }
        let now = current_timestamp();
        let status = OrderStatus::Processing;
        let owner = owner_id.clone();
        Ok(Self {
            id: OrderId::generate(),
            order_number: order_number.into(),
            owner_id,
            lines,
            totals,
            shipping_address,
            payment_method,
            payment_status: PaymentStatus::Pending,
            status,
            status_history: vec![StatusEntry {
                status,
                actor: owner,
                note: None,
                at: now,
            }],
            prescription_id,
            tracking_number: None,
            delivery_date: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Transition to a new status, appending to the history.
    ///
    /// Only terminality is enforced: once delivered or cancelled the
    /// order stops moving.
    pub fn transition(
        &mut self,
        status: OrderStatus,
        actor: UserId,
        note: Option<String>,
    ) -> Result<(), CommerceError> {
        if self.status.is_terminal() {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        let now = current_timestamp();
        self.status = status;
        self.status_history.push(StatusEntry {
            status,
            actor,
            note,
            at: now,
        });
        if status == OrderStatus::Delivered && self.delivery_date.is_none() {
            self.delivery_date = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Record the courier tracking number.
    pub fn set_tracking_number(&mut self, tracking: impl Into<String>) {
        self.tracking_number = Some(tracking.into());
        self.updated_at = current_timestamp();
    }

    /// Assign a fulfillment operator.
    pub fn assign_to(&mut self, operator: UserId) {
        self.assigned_to = Some(operator);
        self.updated_at = current_timestamp();
    }

    /// Record the expected or actual delivery date.
    pub fn set_delivery_date(&mut self, at: i64) {
        self.delivery_date = Some(at);
        self.updated_at = current_timestamp();
    }

    /// Record the payment status.
    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = status;
        self.updated_at = current_timestamp();
    }

    /// Total item count.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
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
    use crate::ids::ProductId;
    use crate::money::Currency;
    use crate::pricing::{PricingConfig, Totals};

    fn sample_line() -> OrderLine {
        OrderLine {
            item: CatalogRef::Product(ProductId::new("prod-1")),
            name: "Paracetamol".to_string(),
            image: None,
            quantity: 2,
            unit_price: Money::new(100, Currency::INR),
            total_price: Money::new(200, Currency::INR),
        }
    }

    fn sample_order() -> Order {
        let config = PricingConfig::new(Currency::INR, 0.18, 50, 500);
        let totals = Totals::quote([(Money::new(100, Currency::INR), 2)], &config).unwrap();
        Order::create(
            "PH-1001",
            UserId::new("user-1"),
            vec![sample_line()],
            totals,
            ShippingAddress::new("Asha Rao", "14 MG Road", "Bengaluru", "560001", "India", "+91-9"),
            PaymentMethod::CashOnDelivery,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_seeds_history() {
        let order = sample_order();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.status_history.len(), 1);
        assert_eq!(order.status_history[0].status, OrderStatus::Processing);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_create_rejects_empty_lines() {
        let config = PricingConfig::new(Currency::INR, 0.18, 50, 500);
        let totals = Totals::quote([(Money::new(100, Currency::INR), 2)], &config).unwrap();
        let result = Order::create(
            "PH-1001",
            UserId::new("user-1"),
            vec![],
            totals,
            ShippingAddress::new("A", "B", "C", "D", "E", "F"),
            PaymentMethod::Card,
            None,
        );
        assert!(matches!(result, Err(CommerceError::ItemsRequired)));
    }

    #[test]
    fn test_transition_appends_history() {
        let mut order = sample_order();
        order
            .transition(OrderStatus::OutForDelivery, UserId::new("op-1"), None)
            .unwrap();
        order
            .transition(
                OrderStatus::Delivered,
                UserId::new("op-1"),
                Some("left at door".to_string()),
            )
            .unwrap();

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.status_history.len(), 3);
        assert!(order.delivery_date.is_some());
    }

    #[test]
    fn test_cancel_after_delivery_rejected() {
        let mut order = sample_order();
        order
            .transition(OrderStatus::Delivered, UserId::new("op-1"), None)
            .unwrap();
        let err = order
            .transition(OrderStatus::Cancelled, UserId::new("op-1"), None)
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        let mut order = sample_order();
        order
            .transition(OrderStatus::OutForDelivery, UserId::new("op-1"), None)
            .unwrap();
        assert!(order.status.can_cancel());
        order
            .transition(OrderStatus::Cancelled, UserId::new("op-1"), None)
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_backward_correction_allowed() {
        // Administrative tooling may need to walk a status back.
        let mut order = sample_order();
        order
            .transition(OrderStatus::OutForDelivery, UserId::new("op-1"), None)
            .unwrap();
        order
            .transition(OrderStatus::Processing, UserId::new("admin-1"), None)
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            OrderStatus::from_str("out-for-delivery"),
            Some(OrderStatus::OutForDelivery)
        );
        assert_eq!(OrderStatus::from_str("shipped"), None);
    }
}
