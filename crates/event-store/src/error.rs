use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The stream's current version did not match the expected version.
    ///
    /// This is the expected, recoverable outcome of two writers racing on the
    /// same stream: the caller should reload the aggregate and retry the
    /// operation from scratch.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The events handed to an append call are not a valid stream segment.
    #[error("Invalid append for aggregate {aggregate_id}: {reason}")]
    InvalidAppend {
        aggregate_id: AggregateId,
        reason: String,
    },

    /// A serialization/deserialization error occurred.
    ///
    /// On the read path this indicates log or schema corruption and is fatal
    /// for that read; it is never silently skipped.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// Returns true for the recoverable expected-version mismatch.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, EventStoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
