use super::{CacheBackend, CacheError};
use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client, RedisResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

const OPERATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed primary cache.
///
/// The connection is opened lazily and dropped after any failed command so the next call
/// reconnects. Each command is bounded by a short timeout so an unresponsive server falls
/// through to the local store quickly.
pub struct RedisCache {
    client: Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisCache {
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(
            OPERATION_TIMEOUT,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| CacheError::Timeout)??;
        log::info!("Connected to Redis");

        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn run<T, F, Fut>(&self, op: F) -> Result<T, CacheError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let conn = self.connection().await?;
        let result = match tokio::time::timeout(OPERATION_TIMEOUT, op(conn)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => CacheError::Redis(e),
            Err(_) => CacheError::Timeout,
        };

        self.connection.lock().await.take();
        Err(result)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let key = key.to_string();
        self.run(|mut conn| async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), CacheError> {
        let key = key.to_string();
        let value = value.to_string();
        self.run(|mut conn| async move {
            match ttl {
                Some(seconds) => conn.set_ex::<_, _, ()>(key, value, seconds).await,
                None => conn.set::<_, _, ()>(key, value).await,
            }
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let key = key.to_string();
        self.run(|mut conn| async move { conn.del::<_, ()>(key).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        assert!(RedisCache::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_error() {
        // port 1 is never a Redis server
        let cache = RedisCache::new("redis://127.0.0.1:1/").unwrap();
        assert!(cache.get("k").await.is_err());
        assert!(cache.set("k", "v", Some(5)).await.is_err());
    }
}
