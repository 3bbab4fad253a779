//! Core aggregate and domain event traits, and the event-sourced root.

use common::{Actor, AggregateId};
use event_store::{EventEnvelope, StoredEvent, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DomainError;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// This is the tag handlers subscribe on and the store filters by.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is a consistency boundary identified by an id. Its state is
/// rebuilt by replaying events; commands validate against current state and
/// produce new events. Version bookkeeping and the uncommitted buffer live in
/// [`EventSourced`], so implementations stay pure state machines.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate's commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name ("Cart", "Product", ...).
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's stream identity.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<&AggregateId>;

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic:
    /// - Given the same state and event, it must always produce the same new state
    /// - It must not have side effects and must not raise further events
    /// - It must not fail (events represent facts that have happened)
    fn apply(&mut self, event: Self::Event);
}

/// An aggregate together with its version counter and the transient buffer
/// of events raised since the last save.
///
/// Lifecycle: created empty (version 0), hydrated via
/// [`EventSourced::load_from_history`], mutated through commands that raise
/// events, and cleared with [`EventSourced::mark_committed`] once the raised
/// events have been confirmed persisted. A root is constructed per use case
/// invocation and discarded after.
pub struct EventSourced<A: Aggregate> {
    state: A,
    version: Version,
    committed_version: Version,
    uncommitted: Vec<A::Event>,
}

impl<A: Aggregate> Default for EventSourced<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Aggregate> EventSourced<A> {
    /// Creates an empty root at version 0.
    pub fn new() -> Self {
        Self {
            state: A::default(),
            version: Version::initial(),
            committed_version: Version::initial(),
            uncommitted: Vec::new(),
        }
    }

    /// Rebuilds the aggregate by replaying an ordered event history.
    ///
    /// Each application bumps the version to that event's version; replayed
    /// events are not added to the uncommitted buffer. A payload that cannot
    /// be reconstituted fails the whole load.
    pub fn load_from_history(history: &[StoredEvent]) -> Result<Self, DomainError> {
        let mut root = Self::new();
        for stored in history {
            let event: A::Event = stored.decode_payload()?;
            root.state.apply(event);
            root.version = stored.version;
        }
        root.committed_version = root.version;
        Ok(root)
    }

    /// Returns the current in-memory state.
    pub fn state(&self) -> &A {
        &self.state
    }

    /// Consumes the root, returning the state.
    pub fn into_state(self) -> A {
        self.state
    }

    /// Returns the version of the last applied event.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Raises a new event: stamps the next version, applies it immediately
    /// (so subsequent logic within the same operation observes updated
    /// state), and appends it to the uncommitted buffer.
    pub fn raise(&mut self, event: A::Event) {
        self.version = self.version.next();
        self.state.apply(event.clone());
        self.uncommitted.push(event);
    }

    /// Runs a command against the current state and raises every event it
    /// produces.
    pub fn apply_command<F>(&mut self, command: F) -> Result<(), A::Error>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
    {
        for event in command(&self.state)? {
            self.raise(event);
        }
        Ok(())
    }

    /// Returns the events raised since the last commit.
    pub fn uncommitted(&self) -> &[A::Event] {
        &self.uncommitted
    }

    /// Returns true if there are raised events awaiting persistence.
    pub fn has_uncommitted(&self) -> bool {
        !self.uncommitted.is_empty()
    }

    /// Clears the uncommitted buffer.
    ///
    /// Must only be called after the store write has been confirmed; clearing
    /// before confirmation loses the events if the write then fails.
    pub fn mark_committed(&mut self) {
        self.uncommitted.clear();
        self.committed_version = self.version;
    }

    /// Builds envelopes for the uncommitted events, stamping versions
    /// contiguously after the last committed version and capturing the
    /// acting user.
    pub fn pending_envelopes(&self, actor: &Actor) -> Result<Vec<EventEnvelope>, DomainError> {
        let aggregate_id = self.state.id().ok_or(DomainError::MissingIdentity {
            aggregate_type: A::aggregate_type(),
        })?;

        let mut envelopes = Vec::with_capacity(self.uncommitted.len());
        let mut version = self.committed_version;
        for event in &self.uncommitted {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(aggregate_id.clone())
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .actor(actor.clone())
                .payload(event)?
                .build();
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}
