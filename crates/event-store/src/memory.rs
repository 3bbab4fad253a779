use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, Result, StoredEvent, Version,
    store::{EventStore, validate_append},
};

/// In-memory event store implementation.
///
/// The log lives for the lifetime of the process: initialized once at
/// startup, never torn down, no durability beyond process exit. Appends take
/// the write lock for the whole log, which also serializes racing writers on
/// the same stream so the optimistic-concurrency check is atomic with the
/// append.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<AggregateId, Vec<StoredEvent>>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored across all streams.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }

    /// Clears all streams.
    pub async fn clear(&self) {
        self.streams.write().await.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[tracing::instrument(skip(self, events), fields(count = events.len()))]
    async fn save_events(
        &self,
        aggregate_id: &AggregateId,
        events: Vec<EventEnvelope>,
        expected_version: Version,
    ) -> Result<Version> {
        validate_append(aggregate_id, &events, expected_version)?;

        let mut streams = self.streams.write().await;
        let stream = streams.entry(aggregate_id.clone()).or_default();

        let current_version = stream
            .last()
            .map(|e| e.version)
            .unwrap_or_else(Version::initial);

        if current_version != expected_version {
            metrics::counter!("event_store_concurrency_conflicts_total").increment(1);
            tracing::warn!(
                %aggregate_id,
                expected = %expected_version,
                actual = %current_version,
                "concurrency conflict on append"
            );
            return Err(crate::EventStoreError::ConcurrencyConflict {
                aggregate_id: aggregate_id.clone(),
                expected: expected_version,
                actual: current_version,
            });
        }

        let appended = events.len() as u64;
        stream.extend(events.into_iter().map(StoredEvent::from_envelope));
        let new_version = stream.last().map(|e| e.version).unwrap_or(current_version);

        metrics::counter!("event_store_events_appended_total").increment(appended);
        tracing::debug!(%aggregate_id, version = %new_version, "events appended");

        Ok(new_version)
    }

    async fn events_after(
        &self,
        aggregate_id: &AggregateId,
        after_version: Version,
    ) -> Result<Vec<StoredEvent>> {
        let streams = self.streams.read().await;
        let events = streams
            .get(aggregate_id)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|e| e.version > after_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }

    async fn all_events(&self) -> Result<Vec<StoredEvent>> {
        let streams = self.streams.read().await;
        let mut events: Vec<StoredEvent> = streams.values().flatten().cloned().collect();
        events.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.aggregate_id.as_str().cmp(b.aggregate_id.as_str()))
                .then(a.version.cmp(&b.version))
        });
        Ok(events)
    }

    async fn stream_version(&self, aggregate_id: &AggregateId) -> Result<Option<Version>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(aggregate_id)
            .and_then(|stream| stream.last())
            .map(|e| e.version))
    }
}
