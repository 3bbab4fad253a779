//! Cache invalidation handlers.
//!
//! Narrow subscribers: each registers for specific concrete event types and
//! translates the event's identifying fields into cache-key invalidations.
//! Side effect only — they never mutate domain state, and a failure here is
//! independent of the audit write (the dispatcher awaits both).

use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::{EventHandler, HandlerError};
use domain::{CartEvent, ProductEvent};
use event_store::EventEnvelope;

use crate::service::CacheService;

fn payload_error(event: &EventEnvelope, source: serde_json::Error) -> HandlerError {
    HandlerError::Payload {
        event_type: event.event_type.clone(),
        source,
    }
}

fn cache_error(e: crate::service::CacheError) -> HandlerError {
    HandlerError::Failed(e.to_string())
}

/// Evicts cached cart views when a cart changes.
///
/// Register with [`CartEvent::TYPES`].
pub struct CartCacheInvalidator<C: CacheService> {
    cache: Arc<C>,
}

impl<C: CacheService> CartCacheInvalidator<C> {
    /// Creates a new cart invalidator over the given cache.
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<C: CacheService> EventHandler for CartCacheInvalidator<C> {
    fn name(&self) -> &'static str {
        "CartCacheInvalidator"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError> {
        // Decode to confirm the payload shape; the key only needs the stream id.
        let _: CartEvent = event
            .decode_payload()
            .map_err(|e| payload_error(event, e))?;

        let key = format!("cart:{}", event.aggregate_id);
        self.cache.invalidate(&key).await.map_err(cache_error)?;
        tracing::debug!(%key, event_type = %event.event_type, "cart cache evicted");
        Ok(())
    }
}

/// Evicts cached product views and listings when the catalog changes.
///
/// Register with [`ProductEvent::TYPES`].
pub struct ProductCacheInvalidator<C: CacheService> {
    cache: Arc<C>,
}

impl<C: CacheService> ProductCacheInvalidator<C> {
    /// Creates a new product invalidator over the given cache.
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<C: CacheService> EventHandler for ProductCacheInvalidator<C> {
    fn name(&self) -> &'static str {
        "ProductCacheInvalidator"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError> {
        let product_event: ProductEvent = event
            .decode_payload()
            .map_err(|e| payload_error(event, e))?;

        let key = format!("product:{}", event.aggregate_id);
        self.cache.invalidate(&key).await.map_err(cache_error)?;

        // A change can affect any cached listing that includes the product,
        // not just its own key.
        match product_event {
            ProductEvent::ProductCreated(data) => {
                self.cache
                    .invalidate_prefix("products:category:")
                    .await
                    .map_err(cache_error)?;
                tracing::debug!(
                    product_id = %data.product_id,
                    "category listings swept for new product"
                );
            }
            ProductEvent::ProductPriceChanged(_) | ProductEvent::ProductStockAdjusted(_) => {
                self.cache
                    .invalidate_prefix("products:")
                    .await
                    .map_err(cache_error)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;
    use domain::{CartItem, DomainEvent, Money, ProductId};
    use event_store::Version;

    use crate::service::InMemoryCacheService;

    fn cart_envelope(event: &CartEvent) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(AggregateId::new("cart-u-1"))
            .aggregate_type("Cart")
            .event_type(event.event_type())
            .version(Version::first())
            .payload(event)
            .unwrap()
            .build()
    }

    fn product_envelope(event: &ProductEvent) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(AggregateId::new("product-SKU-001"))
            .aggregate_type("Product")
            .event_type(event.event_type())
            .version(Version::first())
            .payload(event)
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn item_added_evicts_exact_cart_key() {
        let cache = Arc::new(InMemoryCacheService::new());
        cache.put("cart:cart-u-1", serde_json::json!({})).await;
        cache.put("cart:cart-u-2", serde_json::json!({})).await;

        let handler = CartCacheInvalidator::new(cache.clone());
        let item = CartItem::new("SKU-001", "Widget", 2, Money::from_cents(1000));
        handler
            .handle(&cart_envelope(&CartEvent::item_added(&item)))
            .await
            .unwrap();

        assert!(cache.get("cart:cart-u-1").await.is_none());
        assert!(cache.get("cart:cart-u-2").await.is_some());
    }

    #[tokio::test]
    async fn product_created_sweeps_category_listings() {
        let cache = Arc::new(InMemoryCacheService::new());
        cache
            .put("products:category:tools", serde_json::json!([]))
            .await;
        cache
            .put("products:category:toys", serde_json::json!([]))
            .await;
        cache.put("cart:cart-u-1", serde_json::json!({})).await;

        let handler = ProductCacheInvalidator::new(cache.clone());
        let event = ProductEvent::product_created(
            ProductId::new("SKU-001"),
            "Widget",
            "tools",
            Money::from_cents(1000),
            5,
        );
        handler.handle(&product_envelope(&event)).await.unwrap();

        assert!(cache.get("products:category:tools").await.is_none());
        assert!(cache.get("products:category:toys").await.is_none());
        assert!(cache.get("cart:cart-u-1").await.is_some());
    }

    #[tokio::test]
    async fn price_change_evicts_product_and_listings() {
        let cache = Arc::new(InMemoryCacheService::new());
        cache.put("product:product-SKU-001", serde_json::json!({})).await;
        cache
            .put("products:category:tools", serde_json::json!([]))
            .await;

        let handler = ProductCacheInvalidator::new(cache.clone());
        let event = ProductEvent::price_changed(Money::from_cents(1000), Money::from_cents(900));
        handler.handle(&product_envelope(&event)).await.unwrap();

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_payload_is_surfaced() {
        let cache = Arc::new(InMemoryCacheService::new());
        let handler = CartCacheInvalidator::new(cache);

        let envelope = EventEnvelope::builder()
            .aggregate_id(AggregateId::new("cart-u-1"))
            .aggregate_type("Cart")
            .event_type("ItemAdded")
            .version(Version::first())
            .payload_raw(serde_json::json!({"not": "a cart event"}))
            .build();

        let result = handler.handle(&envelope).await;
        assert!(matches!(result, Err(HandlerError::Payload { .. })));
    }
}
