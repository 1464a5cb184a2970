use crate::domain::BookCandidate;
use crate::ports::MetadataFeed;
use std::collections::HashSet;
use std::sync::Arc;

/// 主フィードへの問い合わせ件数
pub const PRIMARY_LIMIT: usize = 30;

/// 副フィードへの問い合わせ件数
pub const SECONDARY_LIMIT: usize = 20;

/// 返す推薦の最大件数
pub const DEFAULT_LIMIT: usize = 12;

/// 推薦理由（現状は固定文言）
pub const REASON: &str = "目的との主題一致（MVPルール）";

/// 推薦の依存関係
#[derive(Clone)]
pub struct RecommendationDependencies {
    pub primary: Arc<dyn MetadataFeed>,
    pub secondary: Arc<dyn MetadataFeed>,
}

/// 推薦された書籍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub book: BookCandidate,
    pub reason: Option<String>,
}

/// 純粋関数：主フィード→副フィードの順に連結し、ISBNで重複を除く
///
/// 最初に現れた候補を残し、`limit` 件で打ち切る。
pub fn merge_candidates(
    primary: Vec<BookCandidate>,
    secondary: Vec<BookCandidate>,
    limit: usize,
) -> Vec<BookCandidate> {
    let mut seen = HashSet::new();
    primary
        .into_iter()
        .chain(secondary)
        .filter(|candidate| seen.insert(candidate.isbn13.clone()))
        .take(limit)
        .collect()
}

/// 目的文から書籍を推薦する
///
/// 空白のみの目的ではフィードを呼ばずに空を返す。
/// 2つのフィードは並行に問い合わせる。
pub async fn recommend(
    deps: &RecommendationDependencies,
    purpose: &str,
    limit: usize,
) -> Vec<Recommendation> {
    let purpose = purpose.trim();
    if purpose.is_empty() {
        return Vec::new();
    }

    let (primary, secondary) = tokio::join!(
        deps.primary.search(purpose, PRIMARY_LIMIT),
        deps.secondary.search(purpose, SECONDARY_LIMIT),
    );
    tracing::debug!(
        primary = primary.len(),
        secondary = secondary.len(),
        "{} / {} candidates",
        deps.primary.name(),
        deps.secondary.name()
    );

    merge_candidates(primary, secondary, limit)
        .into_iter()
        .map(|book| Recommendation {
            book,
            reason: Some(REASON.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(isbns: &[&str]) -> Vec<BookCandidate> {
        isbns.iter().map(|isbn| BookCandidate::with_isbn(*isbn)).collect()
    }

    fn isbns(books: &[BookCandidate]) -> Vec<&str> {
        books.iter().map(|b| b.isbn13.as_str()).collect()
    }

    #[test]
    fn test_merge_dedups_first_seen_wins() {
        let mut primary = candidates(&["A", "B"]);
        primary[1].title = Some("primary B".to_string());
        let mut secondary = candidates(&["B", "C"]);
        secondary[0].title = Some("secondary B".to_string());

        let merged = merge_candidates(primary, secondary, 12);

        assert_eq!(isbns(&merged), vec!["A", "B", "C"]);
        assert_eq!(merged[1].title.as_deref(), Some("primary B"));
    }

    #[test]
    fn test_merge_truncates_to_limit() {
        let merged = merge_candidates(candidates(&["A", "B", "C"]), candidates(&["D"]), 2);
        assert_eq!(isbns(&merged), vec!["A", "B"]);
    }

    #[test]
    fn test_merge_duplicates_within_one_feed() {
        let merged = merge_candidates(candidates(&["A", "A"]), Vec::new(), 12);
        assert_eq!(isbns(&merged), vec!["A"]);
    }
}
