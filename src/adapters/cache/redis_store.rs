use crate::ports::cache_store::{CacheStore as CacheStoreTrait, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Redis implementation of CacheStore
///
/// One multiplexed connection is opened lazily and shared by every operation.
/// Connecting and each command are bounded by `timeout`; a failed or timed-out
/// operation drops the shared connection so the next call reconnects.
/// Keys are namespaced with a fixed prefix so the store can share a Redis
/// instance with other services.
pub struct CacheStore {
    client: redis::Client,
    prefix: String,
    timeout: Duration,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl CacheStore {
    /// Create a store from a `redis://` URL
    ///
    /// Only parses the URL; no connection is made until the first operation.
    pub fn new(url: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            prefix: prefix.to_string(),
            timeout,
            connection: Mutex::new(None),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut + Send,
        Fut: Future<Output = redis::RedisResult<T>> + Send,
        T: Send,
    {
        let attempt = async {
            let conn = self.connection().await?;
            let value = op(conn).await?;
            Ok::<T, Box<dyn std::error::Error + Send + Sync>>(value)
        };

        match timeout(self.timeout, attempt).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                self.connection.lock().await.take();
                Err(e)
            }
            Err(_) => {
                self.connection.lock().await.take();
                Err(format!("redis operation timed out after {:?}", self.timeout).into())
            }
        }
    }
}

#[async_trait]
impl CacheStoreTrait for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = self.namespaced(key);
        self.run(|mut conn| async move {
            let value: Option<Vec<u8>> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    /// SET with EX; the TTL is clamped to at least one second
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let key = self.namespaced(key);
        let seconds = ttl.as_secs().max(1);
        self.run(|mut conn| async move {
            let _: () = conn.set_ex(key, value, seconds).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str) -> Result<CacheStore> {
        CacheStore::new(url, "libremore", Duration::from_millis(200))
    }

    #[test]
    fn test_keys_are_namespaced() {
        let store = store("redis://127.0.0.1:6379").unwrap();
        assert_eq!(store.namespaced("sysids:宮崎市"), "libremore:sysids:宮崎市");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(store("not a url").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let store = store("redis://127.0.0.1:9").unwrap();
        assert!(store.get("key").await.is_err());
        assert!(store.connection.lock().await.is_none());
    }
}
