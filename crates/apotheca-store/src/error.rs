//! Store error types.

use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A uniqueness or concurrency constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
