//! Read-side query service over the audit log.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use common::AggregateId;
use event_store::{EventStore, StoredEvent, Version};

use crate::error::{AuditError, Result};
use crate::report::{AuditReport, AuditStatistics, top_counts};

/// Hard ceiling on page sizes; larger `take` values are clamped, never
/// honored.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Maximum recent-events window (one week).
pub const MAX_RECENT_HOURS: i64 = 168;

/// Maximum report window length.
pub const MAX_REPORT_DAYS: i64 = 90;

/// Composable filter for audit searches. Supplied criteria are AND-ed.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Case-insensitive substring match on the event type.
    pub event_type: Option<String>,

    /// Substring match on the acting user id.
    pub user_id: Option<String>,

    /// Exact match on the aggregate id.
    pub aggregate_id: Option<AggregateId>,

    /// Events at or after this instant.
    pub from: Option<DateTime<Utc>>,

    /// Events at or before this instant.
    pub to: Option<DateTime<Utc>>,

    /// Number of matching events to skip.
    pub skip: usize,

    /// Maximum number of events to return (clamped to [`MAX_PAGE_SIZE`]).
    pub take: usize,
}

impl AuditFilter {
    /// Creates an empty filter with the maximum page size.
    pub fn new() -> Self {
        Self {
            take: MAX_PAGE_SIZE,
            ..Self::default()
        }
    }

    /// Filters by event-type substring (case-insensitive).
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Filters by acting-user-id substring.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Filters by exact aggregate id.
    pub fn aggregate_id(mut self, aggregate_id: AggregateId) -> Self {
        self.aggregate_id = Some(aggregate_id);
        self
    }

    /// Filters to events at or after this instant.
    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Filters to events at or before this instant.
    pub fn to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Skips this many matching events.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Limits the number of events returned.
    pub fn take(mut self, take: usize) -> Self {
        self.take = take;
        self
    }

    fn matches(&self, event: &StoredEvent) -> bool {
        if let Some(ref needle) = self.event_type
            && !event
                .event_type
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }
        if let Some(ref needle) = self.user_id
            && !event.actor.user_id.contains(needle.as_str())
        {
            return false;
        }
        if let Some(ref id) = self.aggregate_id
            && &event.aggregate_id != id
        {
            return false;
        }
        if let Some(from) = self.from
            && event.occurred_on < from
        {
            return false;
        }
        if let Some(to) = self.to
            && event.occurred_on > to
        {
            return false;
        }
        true
    }
}

/// Read-only queries and reports over the stored log.
///
/// Every operation is an in-memory filter over the full scan — an explicit
/// scalability ceiling appropriate to an in-process log, kept predictable by
/// the page-size and window clamps.
pub struct AuditQueryService<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> AuditQueryService<S> {
    /// Creates a new query service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Paginated full scan, ordered by persistence time.
    #[tracing::instrument(skip(self))]
    pub async fn events(&self, skip: usize, take: usize) -> Result<Vec<StoredEvent>> {
        let events = self.store.all_events().await?;
        Ok(events
            .into_iter()
            .skip(skip)
            .take(take.min(MAX_PAGE_SIZE))
            .collect())
    }

    /// Composite filtered search.
    #[tracing::instrument(skip(self, filter))]
    pub async fn search(&self, filter: AuditFilter) -> Result<Vec<StoredEvent>> {
        let events = self.store.all_events().await?;
        Ok(events
            .into_iter()
            .filter(|e| filter.matches(e))
            .skip(filter.skip)
            .take(filter.take.min(MAX_PAGE_SIZE))
            .collect())
    }

    /// Full ordered history for one aggregate.
    #[tracing::instrument(skip(self))]
    pub async fn aggregate_history(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>> {
        Ok(self
            .store
            .events_after(aggregate_id, Version::initial())
            .await?)
    }

    /// Events within the last N hours, N clamped to [`MAX_RECENT_HOURS`].
    #[tracing::instrument(skip(self))]
    pub async fn recent(&self, hours: i64) -> Result<Vec<StoredEvent>> {
        let hours = hours.clamp(1, MAX_RECENT_HOURS);
        let cutoff = Utc::now() - Duration::hours(hours);
        let events = self.store.all_events().await?;
        Ok(events
            .into_iter()
            .filter(|e| e.occurred_on >= cutoff)
            .take(MAX_PAGE_SIZE)
            .collect())
    }

    /// Aggregate report over an explicit window.
    ///
    /// Rejects `to <= from` and windows longer than [`MAX_REPORT_DAYS`]
    /// before touching the store.
    #[tracing::instrument(skip(self))]
    pub async fn report(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<AuditReport> {
        if to <= from {
            return Err(AuditError::InvalidWindow {
                from,
                to,
                reason: "window end must be after window start".to_string(),
            });
        }
        if to - from > Duration::days(MAX_REPORT_DAYS) {
            return Err(AuditError::InvalidWindow {
                from,
                to,
                reason: format!("window must not exceed {MAX_REPORT_DAYS} days"),
            });
        }

        let events = self.store.all_events().await?;
        let report = AuditReport::from_events(
            from,
            to,
            events
                .iter()
                .filter(|e| e.occurred_on >= from && e.occurred_on <= to),
        );

        metrics::counter!("audit_reports_generated_total").increment(1);
        Ok(report)
    }

    /// Derived summary: last-24h and last-7d counts, top event types/users.
    #[tracing::instrument(skip(self))]
    pub async fn statistics(&self) -> Result<AuditStatistics> {
        let now = Utc::now();
        let day_ago = now - Duration::hours(24);
        let week_ago = now - Duration::days(7);

        let events = self.store.all_events().await?;

        let mut last_24h = 0;
        let mut last_7d = 0;
        let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_user: BTreeMap<String, u64> = BTreeMap::new();

        for event in &events {
            if event.occurred_on >= day_ago {
                last_24h += 1;
            }
            if event.occurred_on >= week_ago {
                last_7d += 1;
            }
            *by_type.entry(event.event_type.clone()).or_default() += 1;
            *by_user.entry(event.actor.user_id.clone()).or_default() += 1;
        }

        Ok(AuditStatistics {
            last_24h,
            last_7d,
            top_event_types: top_counts(by_type, 5),
            top_users: top_counts(by_user, 5),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Actor;
    use event_store::{EventEnvelope, InMemoryEventStore};

    async fn seeded_store() -> Arc<InMemoryEventStore> {
        let store = Arc::new(InMemoryEventStore::new());

        let seed = [
            ("cart-1", 1, "CartCreated", "u-1"),
            ("cart-1", 2, "ItemAdded", "u-1"),
            ("cart-1", 3, "ItemAdded", "u-2"),
            ("cart-2", 1, "CartCreated", "u-2"),
            ("product-SKU-001", 1, "ProductCreated", "admin"),
        ];

        for (aggregate, version, event_type, user) in seed {
            let id = AggregateId::new(aggregate);
            let envelope = EventEnvelope::builder()
                .aggregate_id(id.clone())
                .aggregate_type(if aggregate.starts_with("cart") {
                    "Cart"
                } else {
                    "Product"
                })
                .event_type(event_type)
                .version(Version::new(version))
                .actor(Actor::new(user, user, "127.0.0.1", "test"))
                .payload_raw(serde_json::json!({}))
                .build();
            store
                .save_events(&id, vec![envelope], Version::new(version - 1))
                .await
                .unwrap();
        }

        store
    }

    #[tokio::test]
    async fn events_paginates() {
        let service = AuditQueryService::new(seeded_store().await);

        let page = service.events(0, 3).await.unwrap();
        assert_eq!(page.len(), 3);

        let rest = service.events(3, 10).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn take_is_clamped_to_maximum() {
        let service = AuditQueryService::new(seeded_store().await);
        // More than the clamp requested; only the clamp may be honored.
        let page = service.events(0, 5000).await.unwrap();
        assert!(page.len() <= MAX_PAGE_SIZE);

        let results = service.search(AuditFilter::new().take(5000)).await.unwrap();
        assert!(results.len() <= MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn search_filters_by_type_substring_case_insensitive() {
        let service = AuditQueryService::new(seeded_store().await);

        let results = service
            .search(AuditFilter::new().event_type("itemadd"))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|e| e.event_type == "ItemAdded"));
    }

    #[tokio::test]
    async fn search_filters_compose_with_and() {
        let service = AuditQueryService::new(seeded_store().await);

        let results = service
            .search(
                AuditFilter::new()
                    .event_type("Item")
                    .user_id("u-1")
                    .aggregate_id(AggregateId::new("cart-1")),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].actor.user_id, "u-1");
    }

    #[tokio::test]
    async fn aggregate_history_is_ordered() {
        let service = AuditQueryService::new(seeded_store().await);

        let history = service
            .aggregate_history(&AggregateId::new("cart-1"))
            .await
            .unwrap();
        assert_eq!(history.len(), 3);
        let versions: Vec<i64> = history.iter().map(|e| e.version.as_i64()).collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn recent_clamps_window() {
        let service = AuditQueryService::new(seeded_store().await);

        // All seeded events are fresh; the oversized window is clamped, not
        // rejected.
        let events = service.recent(10_000).await.unwrap();
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn report_counts_within_window() {
        let service = AuditQueryService::new(seeded_store().await);

        let now = Utc::now();
        let report = service
            .report(now - Duration::days(1), now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(report.total_events, 5);
        assert_eq!(report.by_event_type.get("ItemAdded"), Some(&2));
        assert_eq!(report.by_user.get("u-1"), Some(&2));
        assert_eq!(report.by_day.len(), 1);
    }

    #[tokio::test]
    async fn report_rejects_equal_bounds() {
        let service = AuditQueryService::new(seeded_store().await);

        let at = Utc::now();
        let result = service.report(at, at).await;
        assert!(matches!(result, Err(AuditError::InvalidWindow { .. })));
    }

    #[tokio::test]
    async fn report_rejects_oversized_window() {
        let service = AuditQueryService::new(seeded_store().await);

        let now = Utc::now();
        let result = service.report(now - Duration::days(120), now).await;
        assert!(matches!(result, Err(AuditError::InvalidWindow { .. })));
    }

    #[tokio::test]
    async fn statistics_summarize_activity() {
        let service = AuditQueryService::new(seeded_store().await);

        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.last_24h, 5);
        assert_eq!(stats.last_7d, 5);
        assert_eq!(stats.top_event_types[0].0, "CartCreated");
        assert!(stats.top_users.len() <= 5);
    }
}
