use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result, StoredEvent, Version};

/// Core trait for event store implementations.
///
/// The store is an append-only per-aggregate log. All implementations must be
/// thread-safe (Send + Sync) and must serialize concurrent appends to the same
/// stream so the version invariant holds: for a fixed aggregate, stored
/// versions are contiguous from 1 with no gaps and no duplicates.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends the given ordered events to the aggregate's stream.
    ///
    /// The stream's current highest version must equal `expected_version`;
    /// on mismatch the call fails with
    /// [`EventStoreError::ConcurrencyConflict`] and appends nothing
    /// (all-or-nothing). On success each event's stored version is
    /// `expected_version + 1, expected_version + 2, ...` in input order, and
    /// the new stream version is returned.
    async fn save_events(
        &self,
        aggregate_id: &AggregateId,
        events: Vec<EventEnvelope>,
        expected_version: Version,
    ) -> Result<Version>;

    /// Returns the ordered tail of the stream strictly after `after_version`.
    ///
    /// Used to hydrate an aggregate; pass [`Version::initial`] for the full
    /// stream.
    async fn events_after(
        &self,
        aggregate_id: &AggregateId,
        after_version: Version,
    ) -> Result<Vec<StoredEvent>>;

    /// Returns every stored event across all streams, for audit scanning.
    ///
    /// Ordered by persistence time; this is a full scan, appropriate only to
    /// in-process dataset sizes.
    async fn all_events(&self) -> Result<Vec<StoredEvent>>;

    /// Returns the current version of a stream.
    ///
    /// Returns None if the stream has no events.
    async fn stream_version(&self, aggregate_id: &AggregateId) -> Result<Option<Version>>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends a single event, deriving the expected version from the event's
    /// own stamped version.
    async fn save_event(&self, event: EventEnvelope) -> Result<Version> {
        let aggregate_id = event.aggregate_id.clone();
        let expected = event.version.previous();
        self.save_events(&aggregate_id, vec![event], expected).await
    }

    /// Checks if a stream exists (has any events).
    async fn stream_exists(&self, aggregate_id: &AggregateId) -> Result<bool> {
        Ok(self.stream_version(aggregate_id).await?.is_some())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates that an event batch forms a contiguous stream segment starting
/// right after `expected_version`.
pub fn validate_append(
    aggregate_id: &AggregateId,
    events: &[EventEnvelope],
    expected_version: Version,
) -> Result<()> {
    if events.is_empty() {
        return Err(EventStoreError::InvalidAppend {
            aggregate_id: aggregate_id.clone(),
            reason: "cannot append an empty event list".to_string(),
        });
    }

    let mut next = expected_version;
    for event in events {
        if &event.aggregate_id != aggregate_id {
            return Err(EventStoreError::InvalidAppend {
                aggregate_id: aggregate_id.clone(),
                reason: format!(
                    "event {} targets a different aggregate {}",
                    event.event_id, event.aggregate_id
                ),
            });
        }
        next = next.next();
        if event.version != next {
            return Err(EventStoreError::InvalidAppend {
                aggregate_id: aggregate_id.clone(),
                reason: format!("expected version {}, got {}", next, event.version),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(aggregate_id: &str, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(AggregateId::new(aggregate_id))
            .aggregate_type("Cart")
            .event_type("ItemAdded")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({}))
            .build()
    }

    #[test]
    fn validate_append_accepts_contiguous_batch() {
        let id = AggregateId::new("cart-1");
        let events = vec![
            make_event("cart-1", 3),
            make_event("cart-1", 4),
            make_event("cart-1", 5),
        ];
        assert!(validate_append(&id, &events, Version::new(2)).is_ok());
    }

    #[test]
    fn validate_append_rejects_empty_batch() {
        let id = AggregateId::new("cart-1");
        let result = validate_append(&id, &[], Version::initial());
        assert!(matches!(result, Err(EventStoreError::InvalidAppend { .. })));
    }

    #[test]
    fn validate_append_rejects_version_gap() {
        let id = AggregateId::new("cart-1");
        let events = vec![make_event("cart-1", 1), make_event("cart-1", 3)];
        let result = validate_append(&id, &events, Version::initial());
        assert!(matches!(result, Err(EventStoreError::InvalidAppend { .. })));
    }

    #[test]
    fn validate_append_rejects_mixed_aggregates() {
        let id = AggregateId::new("cart-1");
        let events = vec![make_event("cart-1", 1), make_event("cart-2", 2)];
        let result = validate_append(&id, &events, Version::initial());
        assert!(matches!(result, Err(EventStoreError::InvalidAppend { .. })));
    }
}
