use crate::ports::CacheStore;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// キャッシュからJSON値を読む
///
/// ストアのエラーや壊れた値はwarnログを出してミスとして扱う。
pub(crate) async fn get_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = match cache.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Cache read failed for {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => {
            tracing::debug!("Cache hit: {}", key);
            Some(value)
        }
        Err(e) => {
            tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
            None
        }
    }
}

/// JSON値をキャッシュに書く（失敗はwarnログのみ）
pub(crate) async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to encode cache entry {}: {}", key, e);
            return;
        }
    };

    if let Err(e) = cache.set(key, bytes, ttl).await {
        tracing::warn!("Cache write failed for {}: {}", key, e);
    }
}
