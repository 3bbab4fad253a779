//! Domain error types.

use dispatcher::DispatchError;
use event_store::EventStoreError;
use thiserror::Error;

use crate::cart::CartError;
use crate::product::ProductError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Dispatching raised events failed.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// An error occurred in the cart aggregate.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// An error occurred in the product aggregate.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Events were raised before the aggregate had an identity.
    #[error("Aggregate {aggregate_type} has no identity yet")]
    MissingIdentity { aggregate_type: &'static str },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true for the recoverable expected-version mismatch, wherever
    /// it surfaced in the append/dispatch chain.
    pub fn is_concurrency_conflict(&self) -> bool {
        match self {
            DomainError::EventStore(e) => e.is_concurrency_conflict(),
            DomainError::Dispatch(e) => e.is_concurrency_conflict(),
            _ => false,
        }
    }
}
