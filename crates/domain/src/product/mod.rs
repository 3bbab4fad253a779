//! Product aggregate and related types.

mod aggregate;
mod events;
mod service;

pub use aggregate::Product;
pub use events::{
    ProductCreatedData, ProductEvent, ProductPriceChangedData, ProductStockAdjustedData,
};
pub use service::ProductService;

use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Product is already created.
    #[error("Product already created")]
    AlreadyCreated,

    /// Product does not exist yet.
    #[error("Product not found")]
    NotCreated,

    /// Invalid price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// Invalid stock level.
    #[error("Invalid stock: {stock} (must not be negative)")]
    InvalidStock { stock: i64 },
}
