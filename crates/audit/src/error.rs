use chrono::{DateTime, Utc};
use event_store::EventStoreError;
use thiserror::Error;

/// Errors from the audit query surface.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The requested report window is outside the allowed bounds.
    ///
    /// Rejected before touching the store so an out-of-bound request never
    /// triggers an unbounded scan.
    #[error("Invalid report window from {from} to {to}: {reason}")]
    InvalidWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        reason: String,
    },

    /// The underlying event store failed.
    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
