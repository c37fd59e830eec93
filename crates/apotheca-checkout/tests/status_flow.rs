//! Order lifecycle tests: status transitions, fulfillment fields,
//! ownership-scoped reads and prescription propagation.

use std::sync::Arc;

use apotheca_checkout::{CheckoutRequest, CheckoutService, FulfillmentUpdate};
use apotheca_commerce::cart::Cart;
use apotheca_commerce::catalog::CatalogRef;
use apotheca_commerce::checkout::{
    Order, OrderStatus, PaymentMethod, SelectionInput, ShippingAddress,
};
use apotheca_commerce::ids::{MedicineId, OrderId, PrescriptionId, UserId};
use apotheca_commerce::money::{Currency, Money};
use apotheca_commerce::prescription::{Prescription, PrescriptionStatus};
use apotheca_commerce::pricing::PricingConfig;
use apotheca_commerce::CommerceError;
use apotheca_store::memory::{
    MemoryAccountGate, MemoryCartStore, MemoryCatalogStore, MemoryOrderStore,
    MemoryPrescriptionStore,
};
use apotheca_store::{CartStore, PrescriptionGateway, StoreError};
use async_trait::async_trait;

fn pricing() -> PricingConfig {
    PricingConfig::new(Currency::INR, 0.18, 50, 500)
}

struct Harness {
    prescriptions: Arc<MemoryPrescriptionStore>,
    service: CheckoutService,
    user: UserId,
    operator: UserId,
}

impl Harness {
    fn new() -> Self {
        let (harness, _carts) = harness_with_carts();
        harness
    }

    /// Place an order through the real checkout pipeline.
    async fn place_order(&self, carts: &MemoryCartStore, prescription: Option<PrescriptionId>) -> Order {
        let mut cart = Cart::new(self.user.clone(), Currency::INR);
        let line_id = cart
            .add_line(
                CatalogRef::Medicine(MedicineId::new("med-1")),
                "Amoxicillin 250mg",
                None,
                2,
                Money::new(250, Currency::INR),
                &pricing(),
            )
            .unwrap();
        carts.save(&cart).await.unwrap();

        let request = CheckoutRequest {
            shipping_address: ShippingAddress::new(
                "Asha Rao",
                "14 MG Road",
                "Bengaluru",
                "560001",
                "India",
                "+91-9000000000",
            ),
            payment_method: PaymentMethod::CashOnDelivery,
            selection: vec![SelectionInput {
                line_id: Some(line_id),
                quantity: None,
                ..Default::default()
            }],
            prescription_id: prescription,
        };
        self.service
            .checkout(&self.user, request)
            .await
            .unwrap()
            .order
    }
}

/// Convenience harness wiring where the cart store is reachable for
/// seeding.
fn harness_with_carts() -> (Harness, Arc<MemoryCartStore>) {
    let carts = Arc::new(MemoryCartStore::new());
    let catalog = Arc::new(MemoryCatalogStore::new());
    let orders = Arc::new(MemoryOrderStore::new());
    let prescriptions = Arc::new(MemoryPrescriptionStore::new());
    let service = CheckoutService::new(
        carts.clone(),
        catalog,
        orders,
        prescriptions.clone(),
        Arc::new(MemoryAccountGate::new()),
        pricing(),
    );
    (
        Harness {
            prescriptions,
            service,
            user: UserId::new("user-1"),
            operator: UserId::new("op-1"),
        },
        carts,
    )
}

#[tokio::test]
async fn test_full_delivery_lifecycle() -> anyhow::Result<()> {
    let (h, carts) = harness_with_carts();
    let order = h.place_order(&carts, None).await;

    let order = h
        .service
        .transition_order_status(&order.id, OrderStatus::Confirmed, &h.operator, None)
        .await?;
    let order = h
        .service
        .transition_order_status(&order.id, OrderStatus::OutForDelivery, &h.operator, None)
        .await?;
    let order = h
        .service
        .transition_order_status(
            &order.id,
            OrderStatus::Delivered,
            &h.operator,
            Some("left with neighbour".to_string()),
        )
        .await?;

    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.status_history.len(), 4);
    assert!(order.delivery_date.is_some());
    assert_eq!(
        order.status_history.last().unwrap().note.as_deref(),
        Some("left with neighbour")
    );
    Ok(())
}

#[tokio::test]
async fn test_terminal_order_stops_moving() {
    let (h, carts) = harness_with_carts();
    let order = h.place_order(&carts, None).await;

    h.service
        .transition_order_status(&order.id, OrderStatus::Delivered, &h.operator, None)
        .await
        .unwrap();
    let err = h
        .service
        .transition_order_status(&order.id, OrderStatus::Cancelled, &h.operator, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_commerce(),
        Some(CommerceError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn test_cancel_before_delivery() {
    let (h, carts) = harness_with_carts();
    let order = h.place_order(&carts, None).await;

    let order = h
        .service
        .transition_order_status(&order.id, OrderStatus::OutForDelivery, &h.operator, None)
        .await
        .unwrap();
    let order = h
        .service
        .transition_order_status(&order.id, OrderStatus::Cancelled, &h.user, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_transition_unknown_order() {
    let h = Harness::new();
    let err = h
        .service
        .transition_order_status(
            &OrderId::new("order-missing"),
            OrderStatus::Confirmed,
            &h.operator,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_commerce(),
        Some(CommerceError::OrderNotFound(_))
    ));
}

#[tokio::test]
async fn test_get_order_scoped_to_owner() {
    let (h, carts) = harness_with_carts();
    let order = h.place_order(&carts, None).await;

    assert_eq!(
        h.service.get_order(&h.user, &order.id).await.unwrap().id,
        order.id
    );
    let err = h
        .service
        .get_order(&UserId::new("intruder"), &order.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_commerce(),
        Some(CommerceError::OrderNotFound(_))
    ));
}

#[tokio::test]
async fn test_list_orders() {
    let (h, carts) = harness_with_carts();
    h.place_order(&carts, None).await;
    h.place_order(&carts, None).await;

    let orders = h.service.list_orders(&h.user).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(h
        .service
        .list_orders(&UserId::new("someone-else"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_fulfillment_fields_update() {
    let (h, carts) = harness_with_carts();
    let order = h.place_order(&carts, None).await;

    let order = h
        .service
        .update_fulfillment(
            &order.id,
            FulfillmentUpdate {
                tracking_number: Some("TRK-42".to_string()),
                delivery_date: Some(1_760_000_000),
                assigned_to: Some(h.operator.clone()),
            },
        )
        .await
        .unwrap();

    assert_eq!(order.tracking_number.as_deref(), Some("TRK-42"));
    assert_eq!(order.delivery_date, Some(1_760_000_000));
    assert_eq!(order.assigned_to, Some(h.operator.clone()));
}

#[tokio::test]
async fn test_delivery_propagates_to_prescription() {
    let (h, carts) = harness_with_carts();
    let prescription_id = PrescriptionId::new("rx-1");
    h.prescriptions
        .insert(Prescription {
            id: prescription_id.clone(),
            owner_id: h.user.clone(),
            status: PrescriptionStatus::Pending,
            uploaded_at: 0,
        })
        .await;
    let order = h.place_order(&carts, Some(prescription_id.clone())).await;

    h.service
        .transition_order_status(&order.id, OrderStatus::Delivered, &h.operator, None)
        .await
        .unwrap();
    assert_eq!(
        h.prescriptions.status_of(&prescription_id).await,
        Some(PrescriptionStatus::Fulfilled)
    );
}

#[tokio::test]
async fn test_cancellation_propagates_to_prescription() {
    let (h, carts) = harness_with_carts();
    let prescription_id = PrescriptionId::new("rx-1");
    h.prescriptions
        .insert(Prescription {
            id: prescription_id.clone(),
            owner_id: h.user.clone(),
            status: PrescriptionStatus::Pending,
            uploaded_at: 0,
        })
        .await;
    let order = h.place_order(&carts, Some(prescription_id.clone())).await;

    h.service
        .transition_order_status(&order.id, OrderStatus::Cancelled, &h.user, None)
        .await
        .unwrap();
    assert_eq!(
        h.prescriptions.status_of(&prescription_id).await,
        Some(PrescriptionStatus::Cancelled)
    );
}

/// Gateway whose writes always fail, as if the prescription service
/// were down.
struct DownGateway {
    inner: Arc<MemoryPrescriptionStore>,
}

#[async_trait]
impl PrescriptionGateway for DownGateway {
    async fn get(&self, id: &PrescriptionId) -> Result<Option<Prescription>, StoreError> {
        self.inner.get(id).await
    }

    async fn transition(
        &self,
        _id: &PrescriptionId,
        _status: PrescriptionStatus,
        _actor: &UserId,
        _note: Option<&str>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("prescription service unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_propagation_failure_never_blocks_transition() {
    let carts = Arc::new(MemoryCartStore::new());
    let prescriptions = Arc::new(MemoryPrescriptionStore::new());
    let orders = Arc::new(MemoryOrderStore::new());
    let service = CheckoutService::new(
        carts.clone(),
        Arc::new(MemoryCatalogStore::new()),
        orders,
        Arc::new(DownGateway {
            inner: prescriptions.clone(),
        }),
        Arc::new(MemoryAccountGate::new()),
        pricing(),
    );
    let h = Harness {
        prescriptions: prescriptions.clone(),
        service,
        user: UserId::new("user-1"),
        operator: UserId::new("op-1"),
    };

    let prescription_id = PrescriptionId::new("rx-1");
    prescriptions
        .insert(Prescription {
            id: prescription_id.clone(),
            owner_id: h.user.clone(),
            status: PrescriptionStatus::Pending,
            uploaded_at: 0,
        })
        .await;
    let order = h.place_order(&carts, Some(prescription_id.clone())).await;

    // The order transition lands even though propagation keeps failing.
    let order = h
        .service
        .transition_order_status(&order.id, OrderStatus::Delivered, &h.operator, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(
        prescriptions.status_of(&prescription_id).await,
        Some(PrescriptionStatus::Pending)
    );
}
