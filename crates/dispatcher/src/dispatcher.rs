use std::collections::HashMap;
use std::sync::Arc;

use event_store::EventEnvelope;
use futures_util::future::join_all;

use crate::error::{DispatchError, Result};
use crate::handler::EventHandler;

/// Routes raised domain events to their registered handlers.
///
/// The handler registry is populated once through the builder and read-only
/// afterwards. A given event type may have any number of interested handlers;
/// they execute independently and in no guaranteed order relative to each
/// other.
pub struct EventDispatcher {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
    universal: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new dispatcher builder.
    pub fn builder() -> EventDispatcherBuilder {
        EventDispatcherBuilder::default()
    }

    /// Returns the number of handlers that would receive an event of the
    /// given type (universal subscriptions included).
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.universal.len() + self.handlers.get(event_type).map_or(0, Vec::len)
    }

    /// Dispatches a single event to every registered handler for its type.
    ///
    /// All matching handlers are invoked concurrently and all of them are
    /// awaited before this returns. Zero registered handlers is a logged
    /// no-op, not an error. If any handler fails, every failure is logged
    /// and the first one is returned after the rest have completed — a
    /// failing handler never prevents its siblings from running.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type, aggregate_id = %event.aggregate_id))]
    pub async fn dispatch(&self, event: &EventEnvelope) -> Result<()> {
        let selected: Vec<&Arc<dyn EventHandler>> = self
            .universal
            .iter()
            .chain(self.handlers.get(&event.event_type).into_iter().flatten())
            .collect();

        if selected.is_empty() {
            tracing::debug!("no handlers registered, skipping dispatch");
            return Ok(());
        }

        metrics::counter!("dispatcher_events_dispatched_total").increment(1);

        let outcomes = join_all(selected.iter().map(|h| h.handle(event))).await;

        let mut first_failure = None;
        for (handler, outcome) in selected.iter().zip(outcomes) {
            if let Err(source) = outcome {
                metrics::counter!("dispatcher_handler_failures_total").increment(1);
                tracing::error!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    aggregate_id = %event.aggregate_id,
                    version = %event.version,
                    error = %source,
                    "handler failed"
                );
                if first_failure.is_none() {
                    first_failure = Some(DispatchError::Handler {
                        handler: handler.name(),
                        event_type: event.event_type.clone(),
                        source,
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Dispatches a batch of events sequentially.
    ///
    /// Event N+1 is not dispatched until event N's dispatch — all of its
    /// handlers — has completed. Fail-fast: the first event whose dispatch
    /// fails stops the batch, and later events are not dispatched.
    pub async fn dispatch_all(&self, events: &[EventEnvelope]) -> Result<()> {
        for event in events {
            self.dispatch(event).await?;
        }
        Ok(())
    }
}

/// Builds the handler registry at process startup.
#[derive(Default)]
pub struct EventDispatcherBuilder {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
    universal: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcherBuilder {
    /// Registers a handler for one concrete event type.
    pub fn on(mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.entry(event_type.into()).or_default().push(handler);
        self
    }

    /// Registers a handler for several concrete event types at once.
    pub fn on_each(mut self, event_types: &[&str], handler: Arc<dyn EventHandler>) -> Self {
        for event_type in event_types {
            self.handlers
                .entry((*event_type).to_string())
                .or_default()
                .push(handler.clone());
        }
        self
    }

    /// Registers a handler for every event regardless of concrete type —
    /// the broadest possible subscription.
    pub fn on_any(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.universal.push(handler);
        self
    }

    /// Finalizes the registry.
    pub fn build(self) -> EventDispatcher {
        EventDispatcher {
            handlers: self.handlers,
            universal: self.universal,
        }
    }
}
