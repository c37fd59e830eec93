//! Checkout orchestration for Apotheca.
//!
//! [`CheckoutService`] drives the full selective-checkout pipeline
//! (validation, pricing, durable order creation, then best-effort
//! inventory commit, cart reconciliation and prescription propagation)
//! plus order queries and the status lifecycle. Domain rules live in
//! `apotheca-commerce`; persistence sits behind the `apotheca-store`
//! traits.

pub mod error;
pub mod service;

pub use error::CheckoutError;
pub use service::{
    CheckoutOutcome, CheckoutRequest, CheckoutService, FulfillmentUpdate, PostCommitIssue,
};
