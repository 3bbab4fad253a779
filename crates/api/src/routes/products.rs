//! Product mutation endpoints driving the event pipeline.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use domain::{Money, Product, ProductId};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::actor_from_headers;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Deserialize)]
pub struct ChangePriceRequest {
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product
                .product_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: product.name().to_string(),
            category: product.category().to_string(),
            price_cents: product.price().cents(),
            stock: product.stock(),
        }
    }
}

// -- Handlers --

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let actor = actor_from_headers(&headers);
    let product = state
        .product_service
        .create_product(
            ProductId::new(req.product_id),
            req.name,
            req.category,
            Money::from_cents(req.price_cents),
            req.stock,
            &actor,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /products/{product_id}/price — change the price.
#[tracing::instrument(skip(state, headers, req))]
pub async fn change_price<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ChangePriceRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let actor = actor_from_headers(&headers);
    let product = state
        .product_service
        .change_price(
            ProductId::new(product_id),
            Money::from_cents(req.price_cents),
            &actor,
        )
        .await?;

    Ok(Json(product.into()))
}

/// PUT /products/{product_id}/stock — adjust the stock level.
#[tracing::instrument(skip(state, headers, req))]
pub async fn adjust_stock<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let actor = actor_from_headers(&headers);
    let product = state
        .product_service
        .adjust_stock(ProductId::new(product_id), req.delta, &actor)
        .await?;

    Ok(Json(product.into()))
}
