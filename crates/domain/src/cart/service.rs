//! Cart service orchestrating the raise → dispatch → commit flow.

use std::sync::Arc;

use common::{Actor, AggregateId};
use dispatcher::EventDispatcher;
use event_store::{EventStore, Version};

use crate::aggregate::{Aggregate, EventSourced};
use crate::error::DomainError;
use crate::value_objects::{CartItem, ProductId};

use super::Cart;

/// Attempts per operation before a concurrency conflict is surfaced.
const MAX_ATTEMPTS: u32 = 3;

/// Service for cart use cases.
///
/// Each operation hydrates the cart from the event store, runs the command,
/// hands the raised events to the dispatcher (where the bridge persists them
/// and cache invalidators fire), and clears the uncommitted buffer only after
/// dispatch succeeded. Expected-version conflicts reload and retry the whole
/// operation from scratch.
pub struct CartService<S: EventStore> {
    store: Arc<S>,
    dispatcher: Arc<EventDispatcher>,
}

impl<S: EventStore> CartService<S> {
    /// Creates a new cart service.
    pub fn new(store: Arc<S>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Derives the stream key for a user's cart.
    pub fn cart_id(user_id: &str) -> AggregateId {
        AggregateId::new(format!("cart-{user_id}"))
    }

    /// Adds an item to the user's cart, creating the cart on first use.
    #[tracing::instrument(skip(self, item, actor))]
    pub async fn add_item(
        &self,
        user_id: &str,
        item: CartItem,
        actor: &Actor,
    ) -> Result<Cart, DomainError> {
        self.execute(user_id, actor, |root, cart_id, user_id| {
            if root.state().id().is_none() {
                root.apply_command(|c| c.create(cart_id.clone(), user_id))?;
            }
            root.apply_command(|c| c.add_item(item.clone()))?;
            Ok(())
        })
        .await
    }

    /// Removes an item from the user's cart.
    #[tracing::instrument(skip(self, actor))]
    pub async fn remove_item(
        &self,
        user_id: &str,
        product_id: ProductId,
        actor: &Actor,
    ) -> Result<Cart, DomainError> {
        self.execute(user_id, actor, |root, _, _| {
            root.apply_command(|c| c.remove_item(product_id.clone()))?;
            Ok(())
        })
        .await
    }

    /// Empties the user's cart.
    #[tracing::instrument(skip(self, actor))]
    pub async fn clear(&self, user_id: &str, actor: &Actor) -> Result<Cart, DomainError> {
        self.execute(user_id, actor, |root, _, _| {
            root.apply_command(|c| c.clear())?;
            Ok(())
        })
        .await
    }

    /// Checks the user's cart out.
    #[tracing::instrument(skip(self, actor))]
    pub async fn checkout(&self, user_id: &str, actor: &Actor) -> Result<Cart, DomainError> {
        self.execute(user_id, actor, |root, _, _| {
            root.apply_command(|c| c.checkout())?;
            Ok(())
        })
        .await
    }

    /// Loads the user's cart, returning None if it was never created.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, user_id: &str) -> Result<Option<Cart>, DomainError> {
        let cart_id = Self::cart_id(user_id);
        let root = self.load(&cart_id).await?;
        if root.state().id().is_some() {
            Ok(Some(root.into_state()))
        } else {
            Ok(None)
        }
    }

    async fn load(&self, cart_id: &AggregateId) -> Result<EventSourced<Cart>, DomainError> {
        let history = self.store.events_after(cart_id, Version::initial()).await?;
        EventSourced::load_from_history(&history)
    }

    async fn execute<F>(
        &self,
        user_id: &str,
        actor: &Actor,
        command: F,
    ) -> Result<Cart, DomainError>
    where
        F: Fn(&mut EventSourced<Cart>, &AggregateId, &str) -> Result<(), DomainError>,
    {
        let cart_id = Self::cart_id(user_id);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut root = self.load(&cart_id).await?;
            command(&mut root, &cart_id, user_id)?;

            if !root.has_uncommitted() {
                return Ok(root.into_state());
            }

            let envelopes = root.pending_envelopes(actor)?;
            match self.dispatcher.dispatch_all(&envelopes).await {
                Ok(()) => {
                    root.mark_committed();
                    return Ok(root.into_state());
                }
                Err(e) if e.is_concurrency_conflict() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        %cart_id,
                        attempt,
                        "concurrency conflict, reloading and retrying"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
