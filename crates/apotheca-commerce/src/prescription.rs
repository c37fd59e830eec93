//! Prescription workflow linkage.
//!
//! Orders can fulfill a prescription; status transitions on such orders
//! propagate a mapped status to the prescription workflow, best-effort.

use crate::checkout::OrderStatus;
use crate::ids::{PrescriptionId, UserId};
use serde::{Deserialize, Serialize};

/// Prescription workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PrescriptionStatus {
    /// Uploaded, awaiting pharmacist review.
    #[default]
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to delivery.
    OutForDelivery,
    /// Dispensed and delivered.
    Fulfilled,
    /// Workflow cancelled.
    Cancelled,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Processing => "processing",
            PrescriptionStatus::OutForDelivery => "out-for-delivery",
            PrescriptionStatus::Fulfilled => "fulfilled",
            PrescriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Map an order status to the prescription status it propagates.
    pub fn for_order(status: OrderStatus) -> PrescriptionStatus {
        match status {
            OrderStatus::Processing | OrderStatus::Confirmed => PrescriptionStatus::Processing,
            OrderStatus::OutForDelivery => PrescriptionStatus::OutForDelivery,
            OrderStatus::Delivered => PrescriptionStatus::Fulfilled,
            OrderStatus::Cancelled => PrescriptionStatus::Cancelled,
        }
    }
}

/// Read model of a prescription, as this core sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    /// Unique prescription identifier.
    pub id: PrescriptionId,
    /// Account that uploaded the prescription.
    pub owner_id: UserId,
    /// Current workflow status.
    pub status: PrescriptionStatus,
    /// Unix timestamp of upload.
    pub uploaded_at: i64,
}
