//! Bridge from dispatched domain events to the durable audit log.

use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::{EventHandler, HandlerError};
use event_store::{EventEnvelope, EventStore, EventStoreExt};

/// Persists every dispatched domain event as an audit record.
///
/// Registered as a universal subscription, so any new event type is stored
/// without bridge changes. The bridge is a pure side-effect consumer: it
/// appends with the version already stamped by the raising aggregate
/// (`expected_version = version - 1`) and never assigns versions itself, so
/// the aggregate's optimistic-concurrency slot stays the only contested
/// resource — a racing writer surfaces here as a concurrency conflict for the
/// use case to retry.
pub struct EventStoreBridge<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> EventStoreBridge<S> {
    /// Creates a new bridge over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: EventStore> EventHandler for EventStoreBridge<S> {
    fn name(&self) -> &'static str {
        "EventStoreBridge"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError> {
        let new_version = self.store.save_event(event.clone()).await?;

        metrics::counter!("audit_events_recorded_total").increment(1);
        tracing::debug!(
            aggregate_id = %event.aggregate_id,
            event_type = %event.event_type,
            version = %new_version,
            "audit record appended"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;
    use event_store::{EventStoreError, InMemoryEventStore, Version};

    fn make_event(event_type: &str, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(AggregateId::new("cart-1"))
            .aggregate_type("Cart")
            .event_type(event_type)
            .version(Version::new(version))
            .payload_raw(serde_json::json!({"quantity": 2}))
            .build()
    }

    #[tokio::test]
    async fn bridge_appends_with_event_version() {
        let store = Arc::new(InMemoryEventStore::new());
        let bridge = EventStoreBridge::new(store.clone());

        bridge.handle(&make_event("ItemAdded", 1)).await.unwrap();
        bridge.handle(&make_event("ItemRemoved", 2)).await.unwrap();

        let id = AggregateId::new("cart-1");
        let events = store.events_after(&id, Version::initial()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "ItemAdded");
        assert_eq!(events[0].version, Version::first());
        assert_eq!(events[1].version, Version::new(2));
    }

    #[tokio::test]
    async fn bridge_surfaces_concurrency_conflicts() {
        let store = Arc::new(InMemoryEventStore::new());
        let bridge = EventStoreBridge::new(store.clone());

        bridge.handle(&make_event("ItemAdded", 1)).await.unwrap();

        // A stale writer re-dispatches version 1.
        let result = bridge.handle(&make_event("ItemAdded", 1)).await;
        assert!(matches!(
            result,
            Err(HandlerError::Store(EventStoreError::ConcurrencyConflict { .. }))
        ));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn bridge_accepts_any_event_type() {
        let store = Arc::new(InMemoryEventStore::new());
        let bridge = EventStoreBridge::new(store.clone());

        // A type that did not exist when the bridge was written.
        let envelope = EventEnvelope::builder()
            .aggregate_id(AggregateId::new("wishlist-9"))
            .aggregate_type("Wishlist")
            .event_type("WishlistRenamed")
            .version(Version::first())
            .payload_raw(serde_json::json!({"name": "gifts"}))
            .build();

        bridge.handle(&envelope).await.unwrap();

        let stored = store.all_events().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].event_type, "WishlistRenamed");
        assert_eq!(stored[0].aggregate_id, AggregateId::new("wishlist-9"));
    }
}
