//! Checkout service error type.

use apotheca_commerce::CommerceError;
use apotheca_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the checkout service.
///
/// Domain validation failures are client-correctable; store failures
/// are infrastructure trouble. Transport layers map the former to 4xx
/// and the latter to an opaque 5xx without leaking internals.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// The domain failure behind this error, if that is what it is.
    pub fn as_commerce(&self) -> Option<&CommerceError> {
        match self {
            CheckoutError::Commerce(e) => Some(e),
            CheckoutError::Store(_) => None,
        }
    }
}
