use std::sync::LazyLock;

use crate::domain::BookCandidate;
use crate::domain::book::{extract_year, to_isbn13};
use crate::ports::metadata_feed::MetadataFeed;
use async_trait::async_trait;
use regex::Regex;
use url::Url;

use super::syndication::{FeedEntry, FeedError, fetch_entries};

static ISBN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ISBN[:\s]*([0-9Xx\-]+)").expect("ISBN marker pattern is a valid regex")
});

/// CiNii Books OpenSearch フィード（副フィード）
///
/// ISBNは要約（summary/description）中の `ISBN:` 表記から取り出す。
pub struct CiniiFeed {
    client: reqwest::Client,
    base: String,
}

impl CiniiFeed {
    pub fn new(client: reqwest::Client, base: &str) -> Self {
        Self {
            client,
            base: base.to_string(),
        }
    }

    /// 検索URLを組み立てる（`title`, `count`, `format=rss`）
    pub fn request_url(&self, query: &str, limit: usize) -> Result<Url, FeedError> {
        let limit = limit.to_string();
        Ok(Url::parse_with_params(
            &self.base,
            &[("title", query), ("count", limit.as_str()), ("format", "rss")],
        )?)
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<BookCandidate>, FeedError> {
        let url = self.request_url(query, limit)?;
        let entries = fetch_entries(&self.client, url).await?;
        Ok(entries.iter().filter_map(candidate_from_entry).collect())
    }
}

#[async_trait]
impl MetadataFeed for CiniiFeed {
    fn name(&self) -> &'static str {
        "cinii"
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.fetch(query, limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("CiNii search failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }
}

/// 要約から最初の `ISBN:` 表記を取り出し、13桁なら返す
fn isbn_from_summary(summary: &str) -> Option<String> {
    ISBN_MARKER
        .captures(summary)
        .and_then(|caps| caps.get(1))
        .and_then(|m| to_isbn13(m.as_str()))
}

/// フィードのエントリを書籍候補に変換する（13桁ISBNがなければNone）
pub fn candidate_from_entry(entry: &FeedEntry) -> Option<BookCandidate> {
    let isbn13 = isbn_from_summary(entry.get("summary").unwrap_or_default())?;

    Some(BookCandidate {
        isbn13,
        title: entry.get("title").map(str::to_string),
        author: entry.first_of(&["author", "dc_creator"]).map(str::to_string),
        publisher: entry
            .first_of(&["publisher", "dc_publisher"])
            .map(str::to_string),
        pubyear: entry
            .first_of(&["dc_date", "published"])
            .and_then(extract_year),
        ndc: None,
        ndlc: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::feeds::syndication::parse_feed;

    #[test]
    fn test_request_url() {
        let feed = CiniiFeed::new(
            reqwest::Client::new(),
            "https://ci.nii.ac.jp/books/opensearch/search",
        );
        let url = feed.request_url("機械学習", 20).unwrap();
        assert_eq!(url.host_str(), Some("ci.nii.ac.jp"));
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            query,
            vec![
                ("title".to_string(), "機械学習".to_string()),
                ("count".to_string(), "20".to_string()),
                ("format".to_string(), "rss".to_string()),
            ]
        );
    }

    #[test]
    fn test_isbn_from_summary() {
        assert_eq!(
            isbn_from_summary("出版: 2020 ISBN: 978-4-06-512345-X 所蔵館 12"),
            Some("978406512345X".to_string())
        );
        assert_eq!(
            isbn_from_summary("ISBN9784000000019"),
            Some("9784000000019".to_string())
        );
    }

    #[test]
    fn test_isbn_from_summary_rejects_ten_digits_and_missing_marker() {
        assert_eq!(isbn_from_summary("ISBN: 4-06-512345-6"), None);
        assert_eq!(isbn_from_summary("9784000000019"), None);
        assert_eq!(isbn_from_summary(""), None);
    }

    #[test]
    fn test_candidate_from_rss_item() {
        let xml = r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
          <channel>
            <item>
              <title>はじめての機械学習</title>
              <dc:creator>佐藤 花子</dc:creator>
              <dc:publisher>技術評論社</dc:publisher>
              <dc:date>2018</dc:date>
              <description>ISBN:9784000000019</description>
            </item>
            <item>
              <title>ISBNなし</title>
              <description>所蔵館 3</description>
            </item>
          </channel>
        </rss>"#;
        let entries = parse_feed(xml).unwrap();

        let candidates: Vec<BookCandidate> =
            entries.iter().filter_map(candidate_from_entry).collect();

        assert_eq!(candidates.len(), 1);
        let book = &candidates[0];
        assert_eq!(book.isbn13, "9784000000019");
        assert_eq!(book.title.as_deref(), Some("はじめての機械学習"));
        assert_eq!(book.author.as_deref(), Some("佐藤 花子"));
        assert_eq!(book.publisher.as_deref(), Some("技術評論社"));
        assert_eq!(book.pubyear, Some(2018));
    }
}
