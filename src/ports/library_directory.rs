use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 図書館ディレクトリポート
///
/// 市区町村名から、所蔵照会APIで使う図書館システムIDを引く。
/// 現在は静的テーブルによる実装のみだが、外部の図書館一覧APIに差し替えられる。
#[async_trait]
pub trait LibraryDirectory: Send + Sync {
    /// 市区町村の図書館システムIDを順序付きで返す
    async fn systemids_for_city(&self, city: &str) -> Result<Vec<String>>;

    /// 図書館システムのOPACでISBN検索するURLを返す（未知のシステムはNone）
    fn opac_url(&self, systemid: &str, isbn13: &str) -> Option<String>;
}
