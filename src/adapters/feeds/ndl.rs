use crate::domain::BookCandidate;
use crate::domain::book::{extract_year, to_isbn13};
use crate::ports::metadata_feed::MetadataFeed;
use async_trait::async_trait;
use url::Url;

use super::syndication::{FeedEntry, FeedError, fetch_entries};

/// 国立国会図書館サーチ OpenSearch フィード（主フィード）
///
/// ISBNは名前に `isbn` を含むすべてのフィールドを走査して探す。
pub struct NdlFeed {
    client: reqwest::Client,
    base: String,
}

impl NdlFeed {
    pub fn new(client: reqwest::Client, base: &str) -> Self {
        Self {
            client,
            base: base.to_string(),
        }
    }

    /// 検索URLを組み立てる（`q`, `cnt`）
    pub fn request_url(&self, query: &str, limit: usize) -> Result<Url, FeedError> {
        let limit = limit.to_string();
        Ok(Url::parse_with_params(
            &self.base,
            &[("q", query), ("cnt", limit.as_str())],
        )?)
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<BookCandidate>, FeedError> {
        let url = self.request_url(query, limit)?;
        let entries = fetch_entries(&self.client, url).await?;
        Ok(entries.iter().filter_map(candidate_from_entry).collect())
    }
}

#[async_trait]
impl MetadataFeed for NdlFeed {
    fn name(&self) -> &'static str {
        "ndl"
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.fetch(query, limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("NDL search failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }
}

/// フィードのエントリを書籍候補に変換する（13桁ISBNがなければNone）
pub fn candidate_from_entry(entry: &FeedEntry) -> Option<BookCandidate> {
    let isbn13 = entry
        .fields()
        .filter(|(key, _)| key.contains("isbn"))
        .find_map(|(_, value)| to_isbn13(value))?;

    Some(BookCandidate {
        isbn13,
        title: entry.get("title").map(str::to_string),
        author: entry.first_of(&["author", "dc_creator"]).map(str::to_string),
        publisher: entry
            .first_of(&["publisher", "dc_publisher"])
            .map(str::to_string),
        pubyear: entry
            .first_of(&["issued", "published"])
            .and_then(extract_year),
        ndc: None,
        ndlc: None,
    })
}
