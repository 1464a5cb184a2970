use crate::domain::BookCandidate;
use crate::ports::metadata_feed::MetadataFeed as MetadataFeedTrait;
use async_trait::async_trait;
use std::sync::Mutex;

/// MetadataFeedのモック実装
///
/// 固定の候補を返し、受け取った (クエリ, 件数) を記録する。
pub struct MetadataFeed {
    name: &'static str,
    candidates: Vec<BookCandidate>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MetadataFeed {
    pub fn new(name: &'static str, candidates: Vec<BookCandidate>) -> Self {
        Self {
            name,
            candidates,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 記録された呼び出し
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataFeedTrait for MetadataFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.candidates.iter().take(limit).cloned().collect()
    }
}
