//! Cart aggregate and related types.

mod aggregate;
mod events;
mod service;

pub use aggregate::Cart;
pub use events::{
    CartCheckedOutData, CartClearedData, CartCreatedData, CartEvent, ItemAddedData,
    ItemQuantityChangedData, ItemRemovedData,
};
pub use service::CartService;

use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Cart is already created.
    #[error("Cart already created")]
    AlreadyCreated,

    /// Cart does not exist yet.
    #[error("Cart not found")]
    NotCreated,

    /// Cart was already checked out.
    #[error("Cart is checked out, cannot {action}")]
    CheckedOut { action: &'static str },

    /// Item not found in cart.
    #[error("Item not found: {product_id}")]
    ItemNotFound { product_id: String },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Checkout of an empty cart.
    #[error("Cart has no items")]
    Empty,
}
