use crate::ports::cache_store::{CacheStore as CacheStoreTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// CacheStoreのインメモリ実装
///
/// TTLは失効させずに記録だけする。テストから書き込み内容とTTLを確認できる。
/// `fail_reads` を立てると読み込みがすべてエラーになる。
#[derive(Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    fail_reads: Mutex<bool>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用に値を直接登録
    pub fn insert(&self, key: &str, value: Vec<u8>) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, Duration::ZERO));
    }

    /// 書き込まれたキーに対応するTTL
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    /// 書き込まれたキーの一覧（ソート済み）
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 読み込みを失敗させる
    pub fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }
}

#[async_trait]
impl CacheStoreTrait for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if *self.fail_reads.lock().unwrap() {
            return Err("cache unavailable".into());
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, ttl));
        Ok(())
    }
}
