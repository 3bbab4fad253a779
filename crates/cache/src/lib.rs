//! Cache collaborator interface and the narrow handlers that translate
//! domain events into invalidation calls.

pub mod handlers;
pub mod service;

pub use handlers::{CartCacheInvalidator, ProductCacheInvalidator};
pub use service::{CacheError, CacheService, InMemoryCacheService};
