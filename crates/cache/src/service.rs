//! Cache service collaborator interface.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the cache collaborator.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend rejected or failed the operation.
    #[error("Cache operation failed: {0}")]
    Backend(String),
}

/// External cache collaborator.
///
/// Only the invalidation trigger contract is owned here; storage mechanics
/// belong to the implementation behind the trait.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Evicts a single exact key. Evicting a missing key is a no-op.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;

    /// Evicts every key starting with the given prefix.
    ///
    /// Used when an event can affect multiple cached result sets, such as
    /// category listings after a product change.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}

/// In-memory cache implementation.
#[derive(Clone, Default)]
pub struct InMemoryCacheService {
    entries: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryCacheService {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under a key.
    pub async fn put(&self, key: impl Into<String>, value: serde_json::Value) {
        self.entries.write().await.insert(key.into(), value);
    }

    /// Looks a key up.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Returns the number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheService for InMemoryCacheService {
    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let removed = self.entries.write().await.remove(key).is_some();
        tracing::debug!(key, removed, "cache key invalidated");
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        tracing::debug!(prefix, removed = before - entries.len(), "cache prefix swept");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_removes_exact_key() {
        let cache = InMemoryCacheService::new();
        cache.put("cart:cart-1", serde_json::json!({"items": 2})).await;
        cache.put("cart:cart-2", serde_json::json!({"items": 1})).await;

        cache.invalidate("cart:cart-1").await.unwrap();

        assert!(cache.get("cart:cart-1").await.is_none());
        assert!(cache.get("cart:cart-2").await.is_some());
    }

    #[tokio::test]
    async fn invalidate_missing_key_is_noop() {
        let cache = InMemoryCacheService::new();
        assert!(cache.invalidate("cart:nope").await.is_ok());
    }

    #[tokio::test]
    async fn invalidate_prefix_sweeps_matching_keys() {
        let cache = InMemoryCacheService::new();
        cache
            .put("products:category:tools", serde_json::json!([1, 2]))
            .await;
        cache
            .put("products:category:toys", serde_json::json!([3]))
            .await;
        cache.put("product:SKU-001", serde_json::json!({})).await;

        cache.invalidate_prefix("products:category:").await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("product:SKU-001").await.is_some());
    }
}
