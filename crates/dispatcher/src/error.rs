use event_store::EventStoreError;
use thiserror::Error;

/// Errors an individual event handler can produce.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler's event store write failed.
    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),

    /// The handler could not reconstitute the event payload.
    #[error("Malformed payload for {event_type}: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other handler failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Returns true if the failure was a recoverable concurrency conflict.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, HandlerError::Store(e) if e.is_concurrency_conflict())
    }
}

/// Errors surfaced by a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler failed while processing an event.
    ///
    /// Sibling handlers for the same event were still awaited to completion;
    /// this carries the first failure observed.
    #[error("Handler {handler} failed for event {event_type}: {source}")]
    Handler {
        handler: &'static str,
        event_type: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns true if the underlying failure was a concurrency conflict.
    pub fn is_concurrency_conflict(&self) -> bool {
        match self {
            DispatchError::Handler { source, .. } => source.is_concurrency_conflict(),
        }
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
