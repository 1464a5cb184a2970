use crate::ports::cache_store::{CacheStore as CacheStoreTrait, Result};
use async_trait::async_trait;
use std::time::Duration;

/// CacheStore used when no cache backend is configured
///
/// Every read misses and every write is dropped, so callers behave exactly as
/// with a cold cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStore;

impl CacheStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStoreTrait for CacheStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_store_always_misses() {
        let store = CacheStore::new();
        store
            .set("key", b"value".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("key").await.unwrap(), None);
    }
}
