use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Actor, AggregateId, EventEnvelope, EventId, Version};

/// The persisted, audit-shaped form of a domain event.
///
/// Carries every envelope field plus the store-assigned `created_at`
/// (persistence time, distinct from `occurred_on`). Stored events are
/// write-once: the log never mutates or deletes an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The concrete kind of occurrence.
    pub event_type: String,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The logical entity kind ("Cart", "Product", ...).
    pub aggregate_type: String,

    /// The version of the aggregate after this event.
    pub version: Version,

    /// When the event was raised.
    pub occurred_on: DateTime<Utc>,

    /// When the store persisted the event.
    pub created_at: DateTime<Utc>,

    /// Who caused the event.
    pub actor: Actor,

    /// The serialized event payload.
    pub payload: serde_json::Value,

    /// Serialized auxiliary context.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StoredEvent {
    /// Converts an envelope into its persisted form, stamping `created_at`.
    pub fn from_envelope(envelope: EventEnvelope) -> Self {
        Self {
            event_id: envelope.event_id,
            event_type: envelope.event_type,
            aggregate_id: envelope.aggregate_id,
            aggregate_type: envelope.aggregate_type,
            version: envelope.version,
            occurred_on: envelope.occurred_on,
            created_at: Utc::now(),
            actor: envelope.actor,
            payload: envelope.payload,
            metadata: envelope.metadata,
        }
    }

    /// Reconstitutes the payload into its declared event shape.
    ///
    /// A payload that no longer matches the target type indicates log or
    /// schema corruption; the error is surfaced, never skipped.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
