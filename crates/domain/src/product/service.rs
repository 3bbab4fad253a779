//! Product service orchestrating the raise → dispatch → commit flow.

use std::sync::Arc;

use common::{Actor, AggregateId};
use dispatcher::EventDispatcher;
use event_store::{EventStore, Version};

use crate::aggregate::{Aggregate, EventSourced};
use crate::error::DomainError;
use crate::value_objects::{Money, ProductId};

use super::Product;

const MAX_ATTEMPTS: u32 = 3;

/// Service for product catalog use cases.
///
/// Same orchestration as the cart service: hydrate, run the command, dispatch
/// the raised events, mark committed only on success, retry from scratch on a
/// concurrency conflict.
pub struct ProductService<S: EventStore> {
    store: Arc<S>,
    dispatcher: Arc<EventDispatcher>,
}

impl<S: EventStore> ProductService<S> {
    /// Creates a new product service.
    pub fn new(store: Arc<S>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Adds a product to the catalog.
    #[tracing::instrument(skip(self, actor))]
    pub async fn create_product(
        &self,
        product_id: ProductId,
        name: String,
        category: String,
        price: Money,
        stock: i64,
        actor: &Actor,
    ) -> Result<Product, DomainError> {
        self.execute(&product_id, actor, |root| {
            root.apply_command(|p| {
                p.create(
                    product_id.clone(),
                    name.clone(),
                    category.clone(),
                    price,
                    stock,
                )
            })?;
            Ok(())
        })
        .await
    }

    /// Changes a product's price.
    #[tracing::instrument(skip(self, actor))]
    pub async fn change_price(
        &self,
        product_id: ProductId,
        new_price: Money,
        actor: &Actor,
    ) -> Result<Product, DomainError> {
        self.execute(&product_id, actor, |root| {
            root.apply_command(|p| p.change_price(new_price))?;
            Ok(())
        })
        .await
    }

    /// Adjusts a product's stock level.
    #[tracing::instrument(skip(self, actor))]
    pub async fn adjust_stock(
        &self,
        product_id: ProductId,
        delta: i64,
        actor: &Actor,
    ) -> Result<Product, DomainError> {
        self.execute(&product_id, actor, |root| {
            root.apply_command(|p| p.adjust_stock(delta))?;
            Ok(())
        })
        .await
    }

    /// Loads a product, returning None if it was never created.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<Product>, DomainError> {
        let root = self.load(&Product::stream_id(product_id)).await?;
        if root.state().id().is_some() {
            Ok(Some(root.into_state()))
        } else {
            Ok(None)
        }
    }

    async fn load(&self, stream_id: &AggregateId) -> Result<EventSourced<Product>, DomainError> {
        let history = self
            .store
            .events_after(stream_id, Version::initial())
            .await?;
        EventSourced::load_from_history(&history)
    }

    async fn execute<F>(
        &self,
        product_id: &ProductId,
        actor: &Actor,
        command: F,
    ) -> Result<Product, DomainError>
    where
        F: Fn(&mut EventSourced<Product>) -> Result<(), DomainError>,
    {
        let stream_id = Product::stream_id(product_id);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut root = self.load(&stream_id).await?;
            command(&mut root)?;

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
                        %stream_id,
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
