//! HTTP API server with observability for the audit pipeline.
//!
//! Exposes the audit query surface, thin cart/product mutation endpoints
//! that drive the event pipeline, structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use audit::{AuditQueryService, EventStoreBridge};
use axum::Router;
use axum::routing::{delete, get, post, put};
use cache::{CartCacheInvalidator, InMemoryCacheService, ProductCacheInvalidator};
use dispatcher::EventDispatcher;
use domain::{CartEvent, CartService, ProductEvent, ProductService};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub cart_service: CartService<S>,
    pub product_service: ProductService<S>,
    pub audit: AuditQueryService<S>,
    pub cache: Arc<InMemoryCacheService>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Audit query surface
        .route("/eventos", get(routes::events::list::<S>))
        .route("/eventos/tipo/{tipo}", get(routes::events::by_type::<S>))
        .route(
            "/eventos/usuario/{usuario_id}",
            get(routes::events::by_user::<S>),
        )
        .route(
            "/eventos/agregado/{agregado_id}",
            get(routes::events::by_aggregate::<S>),
        )
        .route("/eventos/recientes", get(routes::events::recent::<S>))
        .route("/reporte", get(routes::events::report::<S>))
        .route("/estadisticas", get(routes::events::statistics::<S>))
        .route("/buscar", post(routes::events::search::<S>))
        // Cart mutations driving the pipeline
        .route("/carts/{user_id}/items", post(routes::carts::add_item::<S>))
        .route(
            "/carts/{user_id}/items/{product_id}",
            delete(routes::carts::remove_item::<S>),
        )
        .route("/carts/{user_id}/clear", post(routes::carts::clear::<S>))
        .route(
            "/carts/{user_id}/checkout",
            post(routes::carts::checkout::<S>),
        )
        // Product mutations driving the pipeline
        .route("/products", post(routes::products::create::<S>))
        .route(
            "/products/{product_id}/price",
            put(routes::products::change_price::<S>),
        )
        .route(
            "/products/{product_id}/stock",
            put(routes::products::adjust_stock::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the default composition: one in-memory store, the bridge as the
/// universal handler, and the cache invalidators on their event types.
///
/// The dispatcher registry is populated here, once, at startup.
pub fn create_default_state<S: EventStore + 'static>(event_store: Arc<S>) -> Arc<AppState<S>> {
    let cache = Arc::new(InMemoryCacheService::new());

    let dispatcher = Arc::new(
        EventDispatcher::builder()
            .on_any(Arc::new(EventStoreBridge::new(event_store.clone())))
            .on_each(
                CartEvent::TYPES,
                Arc::new(CartCacheInvalidator::new(cache.clone())),
            )
            .on_each(
                ProductEvent::TYPES,
                Arc::new(ProductCacheInvalidator::new(cache.clone())),
            )
            .build(),
    );

    Arc::new(AppState {
        cart_service: CartService::new(event_store.clone(), dispatcher.clone()),
        product_service: ProductService::new(event_store.clone(), dispatcher),
        audit: AuditQueryService::new(event_store),
        cache,
    })
}
