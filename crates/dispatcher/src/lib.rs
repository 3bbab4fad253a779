//! In-process publish/subscribe routing from raised domain events to their
//! registered handlers.
//!
//! The registry is built once at startup and is immutable afterwards, so
//! dispatch reads need no locking. Handlers for one event run concurrently;
//! events in a batch are dispatched strictly one after another.

pub mod dispatcher;
pub mod error;
pub mod handler;

pub use dispatcher::{EventDispatcher, EventDispatcherBuilder};
pub use error::{DispatchError, HandlerError};
pub use handler::EventHandler;
