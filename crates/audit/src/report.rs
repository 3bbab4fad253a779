//! Aggregated report and statistics shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use event_store::StoredEvent;

/// Aggregate report over an explicit `[from, to]` window.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Window start (inclusive).
    pub from: DateTime<Utc>,

    /// Window end (inclusive).
    pub to: DateTime<Utc>,

    /// Total number of events in the window.
    pub total_events: u64,

    /// Event count per event type.
    pub by_event_type: BTreeMap<String, u64>,

    /// Event count per acting user id.
    pub by_user: BTreeMap<String, u64>,

    /// Event count per calendar day (`YYYY-MM-DD`).
    pub by_day: BTreeMap<String, u64>,
}

impl AuditReport {
    /// Builds a report from the events inside the window.
    pub fn from_events<'a>(
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        events: impl Iterator<Item = &'a StoredEvent>,
    ) -> Self {
        let mut report = Self {
            from,
            to,
            total_events: 0,
            by_event_type: BTreeMap::new(),
            by_user: BTreeMap::new(),
            by_day: BTreeMap::new(),
        };

        for event in events {
            report.total_events += 1;
            *report
                .by_event_type
                .entry(event.event_type.clone())
                .or_default() += 1;
            *report
                .by_user
                .entry(event.actor.user_id.clone())
                .or_default() += 1;
            let day = event.occurred_on.format("%Y-%m-%d").to_string();
            *report.by_day.entry(day).or_default() += 1;
        }

        report
    }
}

/// Derived summary of recent audit activity.
#[derive(Debug, Clone, Serialize)]
pub struct AuditStatistics {
    /// Events in the last 24 hours.
    pub last_24h: u64,

    /// Events in the last 7 days.
    pub last_7d: u64,

    /// Most frequent event types, descending, at most five.
    pub top_event_types: Vec<(String, u64)>,

    /// Most active acting users, descending, at most five.
    pub top_users: Vec<(String, u64)>,
}

pub(crate) fn top_counts(counts: BTreeMap<String, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    // Descending by count; the BTreeMap already fixed the key order for ties.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Actor, AggregateId};
    use event_store::{EventEnvelope, Version};

    fn stored(event_type: &str, user_id: &str) -> StoredEvent {
        let envelope = EventEnvelope::builder()
            .aggregate_id(AggregateId::new("cart-1"))
            .aggregate_type("Cart")
            .event_type(event_type)
            .version(Version::first())
            .actor(Actor::new(user_id, user_id, "", ""))
            .payload_raw(serde_json::json!({}))
            .build();
        StoredEvent::from_envelope(envelope)
    }

    #[test]
    fn report_breaks_down_by_type_user_and_day() {
        let events = vec![
            stored("ItemAdded", "u-1"),
            stored("ItemAdded", "u-2"),
            stored("CartCheckedOut", "u-1"),
        ];

        let now = Utc::now();
        let report =
            AuditReport::from_events(now - chrono::Duration::days(1), now, events.iter());

        assert_eq!(report.total_events, 3);
        assert_eq!(report.by_event_type.get("ItemAdded"), Some(&2));
        assert_eq!(report.by_event_type.get("CartCheckedOut"), Some(&1));
        assert_eq!(report.by_user.get("u-1"), Some(&2));
        assert_eq!(report.by_day.len(), 1);
        let today = now.format("%Y-%m-%d").to_string();
        assert_eq!(report.by_day.get(&today), Some(&3));
    }

    #[test]
    fn top_counts_orders_descending_and_truncates() {
        let mut counts = BTreeMap::new();
        counts.insert("a".to_string(), 1u64);
        counts.insert("b".to_string(), 5);
        counts.insert("c".to_string(), 3);

        let top = top_counts(counts, 2);
        assert_eq!(top, vec![("b".to_string(), 5), ("c".to_string(), 3)]);
    }
}
