//! Key/value cache with a best-effort local fallback.
//!
//! [`CacheService`] prefers the shared primary backend (Redis in production). Any error
//! from the primary is logged at `warn` and the call is served by the process-local
//! [`LocalCache`] instead, so registration and verification flows keep working while the
//! shared cache is down. Callers never see primary errors: a failed primary with nothing
//! stored locally reads as absence.

mod local;
mod redis;

pub use local::LocalCache;
pub use redis::RedisCache;

use crate::error::AppResult;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("cache backend timed out")]
    Timeout,

    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// A shared cache reachable over the network. Values are JSON strings.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// `ttl` in seconds; `None` keeps the value until it is overwritten or deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Clone)]
pub struct CacheService {
    primary: Arc<dyn CacheBackend>,
    fallback: LocalCache,
}

impl CacheService {
    pub fn new(primary: Arc<dyn CacheBackend>, fallback: LocalCache) -> Self {
        Self { primary, fallback }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.primary.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Cache get failed: {e}");
                self.fallback.get(key).await
            }
        }?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding malformed cache value for {key}: {e}");
                None
            }
        }
    }

    /// Stores `value` for `ttl` seconds (`None` or `Some(0)` means no expiry).
    ///
    /// Only serialization can fail; backend failures degrade to the local store.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<u64>) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        let ttl = ttl.filter(|secs| *secs > 0);

        if let Err(e) = self.primary.set(key, &raw, ttl).await {
            log::warn!("Cache set failed: {e}");
            self.fallback.set(key, raw, ttl).await;
        }
        Ok(())
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.primary.delete(key).await {
            log::warn!("Cache delete failed: {e}");
            self.fallback.delete(key).await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_then_get_via_primary() {
        let primary = Arc::new(MapCache::default());
        let local = LocalCache::new();
        let cache = CacheService::new(primary.clone(), local.clone());

        cache.set("k", &json!({"a": 1}), None).await.unwrap();

        let value: Option<serde_json::Value> = cache.get("k").await;
        assert_eq!(value, Some(json!({"a": 1})));
        assert!(primary.values.lock().await.contains_key("k"));
        assert_eq!(local.get("k").await, None);
    }

    #[tokio::test]
    async fn test_set_then_get_via_fallback() {
        let cache = fallback_only();

        cache.set("k", &"v".to_string(), None).await.unwrap();

        let value: Option<String> = cache.get("k").await;
        assert_eq!(value.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_fallback_value_expires_after_ttl() {
        let cache = fallback_only();

        cache.set("test:fallback", &json!({"a": 1}), Some(2)).await.unwrap();
        let immediate: Option<serde_json::Value> = cache.get("test:fallback").await;
        assert_eq!(immediate, Some(json!({"a": 1})));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let later: Option<serde_json::Value> = cache.get("test:fallback").await;
        assert_eq!(later, None);
    }

    #[tokio::test]
    async fn test_missing_key_reads_as_absent() {
        let cache = fallback_only();
        let value: Option<String> = cache.get("nope").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_delete_falls_back_to_local_store() {
        let cache = fallback_only();
        cache.set("k", &1u32, Some(60)).await.unwrap();
        cache.delete("k").await;
        let value: Option<u32> = cache.get("k").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_type_mismatch_reads_as_absent() {
        let cache = fallback_only();
        cache.set("k", &"not a number", None).await.unwrap();
        let value: Option<u32> = cache.get("k").await;
        assert!(value.is_none());
    }
}
