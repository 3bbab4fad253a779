//! Cart mutation endpoints driving the event pipeline.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use domain::{Cart, CartItem, Money, ProductId};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::actor_from_headers;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_cents: i64,
    pub checked_out: bool,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let mut items: Vec<CartItemResponse> = cart
            .items()
            .map(|item| CartItemResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
            })
            .collect();
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        Self {
            user_id: cart.user_id().unwrap_or_default().to_string(),
            total_cents: cart.total_amount().cents(),
            checked_out: cart.is_checked_out(),
            items,
        }
    }
}

// -- Handlers --

/// POST /carts/{user_id}/items — add an item, creating the cart on first use.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let actor = actor_from_headers(&headers);
    let item = CartItem::new(
        req.product_id.as_str(),
        req.product_name.as_str(),
        req.quantity,
        Money::from_cents(req.unit_price_cents),
    );

    let cart = state.cart_service.add_item(&user_id, item, &actor).await?;

    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// DELETE /carts/{user_id}/items/{product_id} — remove an item.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_item<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((user_id, product_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let actor = actor_from_headers(&headers);
    let cart = state
        .cart_service
        .remove_item(&user_id, ProductId::new(product_id), &actor)
        .await?;

    Ok(Json(cart.into()))
}

/// POST /carts/{user_id}/clear — empty the cart.
#[tracing::instrument(skip(state, headers))]
pub async fn clear<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let actor = actor_from_headers(&headers);
    let cart = state.cart_service.clear(&user_id, &actor).await?;

    Ok(Json(cart.into()))
}

/// POST /carts/{user_id}/checkout — check the cart out.
#[tracing::instrument(skip(state, headers))]
pub async fn checkout<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let actor = actor_from_headers(&headers);
    let cart = state.cart_service.checkout(&user_id, &actor).await?;

    Ok(Json(cart.into()))
}
