use crate::domain::BookCandidate;
use async_trait::async_trait;

/// 書誌メタデータフィードポート
///
/// フリーテキストで外部書誌フィードを検索し、共通の書籍候補に正規化する。
/// ISBNの抽出方法はフィードごとに異なるが、正規化処理は共通。
///
/// 検索は失敗しない契約とする。通信エラーは実装側でログに記録し、空の結果を返す。
#[async_trait]
pub trait MetadataFeed: Send + Sync {
    /// ログ用のフィード名
    fn name(&self) -> &'static str;

    /// クエリで検索する（空白のみのクエリは外部呼び出しなしで空を返す）
    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate>;
}
