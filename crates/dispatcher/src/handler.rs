use async_trait::async_trait;
use event_store::EventEnvelope;

use crate::error::HandlerError;

/// Capability trait: "handles events".
///
/// Handlers receive the type-erased envelope and decode the payload
/// themselves, so a single handler can subscribe to any number of concrete
/// event types — or, registered as universal, to every event in the system.
/// Handlers must be side-effect consumers only; they never mutate domain
/// state.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the handler's name, used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Processes a single event.
    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError>;
}
