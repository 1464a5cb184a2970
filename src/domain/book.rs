use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::BookId;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern is a valid regex"));

/// 外部書誌フィードから得た書籍候補
///
/// `isbn13` を持つものだけが候補になる。`ndc` / `ndlc` は現在のアダプタでは常に空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCandidate {
    pub isbn13: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub pubyear: Option<i32>,
    pub ndc: Option<String>,
    pub ndlc: Option<String>,
}

impl BookCandidate {
    /// ISBNのみを持つ候補を作成する
    pub fn with_isbn(isbn13: impl Into<String>) -> Self {
        Self {
            isbn13: isbn13.into(),
            title: None,
            author: None,
            publisher: None,
            pubyear: None,
            ndc: None,
            ndlc: None,
        }
    }
}

/// 永続化された書籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub isbn13: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub pubyear: Option<i32>,
    pub ndc: Option<String>,
    pub ndlc: Option<String>,
}

/// 純粋関数：ISBNだけが分かっている書籍を仮登録用に作る
///
/// タイトルは「書籍 {isbn}」とする。
pub fn placeholder_book(isbn13: &str) -> Book {
    Book {
        book_id: BookId::new(),
        isbn13: isbn13.to_string(),
        title: format!("書籍 {}", isbn13),
        author: None,
        publisher: None,
        pubyear: None,
        ndc: None,
        ndlc: None,
    }
}

// ============================================================================
// ISBN・出版年の正規化
// ============================================================================

/// `[0-9Xx]` 以外の文字をすべて除去し、10桁または13桁なら返す
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect();
    matches!(digits.len(), 10 | 13).then_some(digits)
}

/// 13桁に正規化できる場合のみ返す
///
/// 10桁のISBNは13桁に変換せず、候補から外す。
pub fn to_isbn13(raw: &str) -> Option<String> {
    normalize_isbn(raw).filter(|isbn| isbn.len() == 13)
}

/// 日付らしき文字列から最初の4桁を出版年として取り出す
pub fn extract_year(date: &str) -> Option<i32> {
    YEAR_PATTERN
        .find(date)
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_isbn_strips_separators() {
        assert_eq!(
            normalize_isbn("978-4-06-512345-X"),
            Some("978406512345X".to_string())
        );
        assert_eq!(normalize_isbn("4-06-512345-6"), Some("4065123456".to_string()));
    }

    #[test]
    fn test_normalize_isbn_rejects_other_lengths() {
        assert_eq!(normalize_isbn("978-4-06"), None);
        assert_eq!(normalize_isbn("97840651234567"), None);
        assert_eq!(normalize_isbn(""), None);
    }

    #[test]
    fn test_to_isbn13_accepts_thirteen_characters() {
        let isbn = to_isbn13("ISBN 978-4-06-512345-X").unwrap();
        assert_eq!(isbn.len(), 13);
        assert_eq!(isbn, "978406512345X");
    }

    #[test]
    fn test_to_isbn13_discards_ten_digit_isbn() {
        // 10桁は変換も補完もしない
        assert_eq!(to_isbn13("4-06-512345-6"), None);
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2021-04-01"), Some(2021));
        assert_eq!(extract_year("Mon, 05 Jul 1999 00:00:00 +0900"), Some(1999));
        assert_eq!(extract_year("令和3年"), None);
    }

    #[test]
    fn test_placeholder_book_title() {
        let book = placeholder_book("9784000000000");
        assert_eq!(book.title, "書籍 9784000000000");
        assert_eq!(book.isbn13, "9784000000000");
        assert!(book.author.is_none());
    }
}
