use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 在庫キーワード（libkeyの自由記述にいずれかが含まれれば在架とみなす）
pub const AVAILABLE_KEYWORDS: &[&str] = &["在庫", "蔵書", "利用可", "提供"];

/// 貸出キーワード
pub const ON_LOAN_KEYWORDS: &[&str] = &["貸出", "貸し出し", "貸出中"];

/// 予約キーワード
pub const RESERVATION_KEYWORDS: &[&str] = &["予約"];

// ============================================================================
// 所蔵ステータス
// ============================================================================

/// 正規化された所蔵ステータス
///
/// 外部APIのステータスコードと館ごとの自由記述を、この語彙に変換する。
/// 変換表にない未知のコードは `Other` としてそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AvailabilityStatus {
    /// 在架
    Available,
    /// 蔵書なし
    NotHeld,
    /// 貸出中
    OnLoan,
    /// 予約受付中
    Reservable,
    /// 照会中（不明・フォールバック）
    Pending,
    /// 在架（キャッシュ）
    AvailableCached,
    /// 変換表にないプロバイダのコード
    Other(String),
}

impl AvailabilityStatus {
    /// 表示ラベルを取得する
    pub fn as_str(&self) -> &str {
        match self {
            AvailabilityStatus::Available => "在架",
            AvailabilityStatus::NotHeld => "蔵書なし",
            AvailabilityStatus::OnLoan => "貸出中",
            AvailabilityStatus::Reservable => "予約受付中",
            AvailabilityStatus::Pending => "照会中",
            AvailabilityStatus::AvailableCached => "在架(キャッシュ)",
            AvailabilityStatus::Other(code) => code.as_str(),
        }
    }

    /// プロバイダのステータスコードを変換する
    ///
    /// 変換表: OK→在架, NG→蔵書なし, Cache→在架(キャッシュ), Running→照会中。
    /// それ以外はコード文字列をそのまま保持する。
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "OK" => AvailabilityStatus::Available,
            "NG" => AvailabilityStatus::NotHeld,
            "Cache" => AvailabilityStatus::AvailableCached,
            "Running" => AvailabilityStatus::Pending,
            other => AvailabilityStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AvailabilityStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "在架" => AvailabilityStatus::Available,
            "蔵書なし" => AvailabilityStatus::NotHeld,
            "貸出中" => AvailabilityStatus::OnLoan,
            "予約受付中" => AvailabilityStatus::Reservable,
            "照会中" => AvailabilityStatus::Pending,
            "在架(キャッシュ)" => AvailabilityStatus::AvailableCached,
            _ => AvailabilityStatus::Other(label),
        }
    }
}

impl From<AvailabilityStatus> for String {
    fn from(status: AvailabilityStatus) -> Self {
        match status {
            AvailabilityStatus::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

/// (ISBN, システムID) ごとの所蔵結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub isbn13: String,
    pub systemid: String,
    pub status: AvailabilityStatus,
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：プロバイダの生エントリをステータスに変換する
///
/// 1. エントリなし（または空）→ 照会中
/// 2. `status` コードを変換表で変換（null/欠落は照会中）
/// 3. `libkey`（館名→自由記述）に在庫/貸出/予約キーワードが含まれれば、
///    この優先順位でステータスを上書きする（部分一致）
pub fn interpret_status(entry: Option<&Map<String, Value>>) -> AvailabilityStatus {
    let Some(entry) = entry.filter(|e| !e.is_empty()) else {
        return AvailabilityStatus::Pending;
    };

    let mut status = match entry.get("status") {
        None | Some(Value::Null) => AvailabilityStatus::Pending,
        Some(Value::String(code)) => AvailabilityStatus::from_provider_code(code),
        Some(other) => AvailabilityStatus::Other(other.to_string()),
    };

    if let Some(libkey) = entry.get("libkey").and_then(Value::as_object) {
        let texts: Vec<String> = libkey.values().map(value_text).collect();
        let contains_any =
            |keywords: &[&str]| texts.iter().any(|t| keywords.iter().any(|k| t.contains(*k)));

        if contains_any(AVAILABLE_KEYWORDS) {
            status = AvailabilityStatus::Available;
        } else if contains_any(ON_LOAN_KEYWORDS) {
            status = AvailabilityStatus::OnLoan;
        } else if contains_any(RESERVATION_KEYWORDS) {
            status = AvailabilityStatus::Reservable;
        }
    }

    status
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 純粋関数：全組み合わせを照会中にしたフォールバック行を生成する
///
/// 行の順序はISBN優先（外側ISBN、内側システムID）。
pub fn fallback_rows(isbns: &[String], systemids: &[String]) -> Vec<AvailabilityRow> {
    isbns
        .iter()
        .flat_map(|isbn| {
            systemids.iter().map(move |systemid| AvailabilityRow {
                isbn13: isbn.clone(),
                systemid: systemid.clone(),
                status: AvailabilityStatus::Pending,
            })
        })
        .collect()
}

/// 純粋関数：プロバイダの `books` ペイロードから行を組み立てる
///
/// `books[isbn][systemid]` が存在しない組み合わせも照会中として必ず1行を出す。
pub fn rows_from_books(books: &Value, isbns: &[String], systemids: &[String]) -> Vec<AvailabilityRow> {
    let mut rows = Vec::with_capacity(isbns.len() * systemids.len());
    for isbn in isbns {
        let systems = books.get(isbn).and_then(Value::as_object);
        for systemid in systemids {
            let entry = systems
                .and_then(|s| s.get(systemid))
                .and_then(Value::as_object);
            rows.push(AvailabilityRow {
                isbn13: isbn.clone(),
                systemid: systemid.clone(),
                status: interpret_status(entry),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_interpret_none_is_pending() {
        assert_eq!(interpret_status(None), AvailabilityStatus::Pending);
    }

    #[test]
    fn test_interpret_empty_entry_is_pending() {
        let e = Map::new();
        assert_eq!(interpret_status(Some(&e)), AvailabilityStatus::Pending);
    }

    #[test]
    fn test_interpret_status_code_table() {
        let ok = entry(json!({"status": "OK"}));
        let ng = entry(json!({"status": "NG"}));
        let cache = entry(json!({"status": "Cache"}));
        let running = entry(json!({"status": "Running"}));

        assert_eq!(interpret_status(Some(&ok)).as_str(), "在架");
        assert_eq!(interpret_status(Some(&ng)).as_str(), "蔵書なし");
        assert_eq!(interpret_status(Some(&cache)).as_str(), "在架(キャッシュ)");
        assert_eq!(interpret_status(Some(&running)).as_str(), "照会中");
    }

    #[test]
    fn test_interpret_unknown_code_passes_through() {
        let e = entry(json!({"status": "Weird"}));
        let status = interpret_status(Some(&e));
        assert_eq!(status, AvailabilityStatus::Other("Weird".to_string()));
        assert_eq!(status.as_str(), "Weird");
    }

    #[test]
    fn test_interpret_null_code_is_pending() {
        let e = entry(json!({"status": null, "reserveurl": ""}));
        assert_eq!(interpret_status(Some(&e)), AvailabilityStatus::Pending);
    }

    #[test]
    fn test_available_keyword_wins_over_loan_keyword() {
        let e = entry(json!({
            "status": "OK",
            "libkey": {"本館": "貸出中", "分館": "在庫あり"}
        }));
        assert_eq!(interpret_status(Some(&e)), AvailabilityStatus::Available);
    }

    #[test]
    fn test_loan_keyword_overrides_status_code() {
        let e = entry(json!({
            "status": "OK",
            "libkey": {"本館": "貸し出し中"}
        }));
        assert_eq!(interpret_status(Some(&e)), AvailabilityStatus::OnLoan);
    }

    #[test]
    fn test_reservation_keyword_is_lowest_priority() {
        let e = entry(json!({
            "status": "NG",
            "libkey": {"本館": "予約中"}
        }));
        assert_eq!(interpret_status(Some(&e)), AvailabilityStatus::Reservable);

        let both = entry(json!({
            "status": "NG",
            "libkey": {"本館": "予約中", "分館": "貸出中"}
        }));
        assert_eq!(interpret_status(Some(&both)), AvailabilityStatus::OnLoan);
    }

    #[test]
    fn test_libkey_without_keywords_keeps_code() {
        let e = entry(json!({
            "status": "NG",
            "libkey": {"本館": "休館中"}
        }));
        assert_eq!(interpret_status(Some(&e)), AvailabilityStatus::NotHeld);
    }

    #[test]
    fn test_status_serializes_as_label() {
        let row = AvailabilityRow {
            isbn13: "9784000000000".to_string(),
            systemid: "Sys-1".to_string(),
            status: AvailabilityStatus::OnLoan,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["status"], "貸出中");

        let back: AvailabilityRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_fallback_rows_cover_every_pair_isbn_major() {
        let isbns = vec!["A".to_string(), "B".to_string()];
        let systemids = vec!["S1".to_string(), "S2".to_string(), "S3".to_string()];

        let rows = fallback_rows(&isbns, &systemids);

        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.status == AvailabilityStatus::Pending));
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.isbn13.as_str(), r.systemid.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A", "S1"),
                ("A", "S2"),
                ("A", "S3"),
                ("B", "S1"),
                ("B", "S2"),
                ("B", "S3"),
            ]
        );
    }

    #[test]
    fn test_rows_from_books_fills_missing_entries_with_pending() {
        let books = json!({
            "A": {"S1": {"status": "OK"}},
        });
        let isbns = vec!["A".to_string(), "B".to_string()];
        let systemids = vec!["S1".to_string(), "S2".to_string()];

        let rows = rows_from_books(&books, &isbns, &systemids);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].status, AvailabilityStatus::Available);
        assert_eq!(rows[1].status, AvailabilityStatus::Pending);
        assert_eq!(rows[2].status, AvailabilityStatus::Pending);
        assert_eq!(rows[3].status, AvailabilityStatus::Pending);
    }
}
