use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 所蔵照会APIの応答
///
/// `continue == 1` の間は `session` を使ってポーリングを続ける必要がある。
/// `books` は `books[isbn][systemid] = {status, libkey, ...}` の形。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub session: Option<String>,
    #[serde(rename = "continue", default)]
    pub continue_polling: i64,
    #[serde(default)]
    pub books: Value,
}

impl CheckResponse {
    /// まだ照会中でポーリングが必要か
    pub fn should_continue(&self) -> bool {
        self.continue_polling == 1
    }
}

/// 所蔵照会プロバイダポート
///
/// セッション型の照会プロトコルを抽象化する。
/// 通信エラー（接続失敗、タイムアウト、2xx以外）はErrで返し、
/// フォールバックの判断はアプリケーション層が行う。
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// 照会を開始する
    async fn check(&self, isbns: &[String], systemids: &[String]) -> Result<CheckResponse>;

    /// セッションを指定して照会結果をポーリングする
    async fn poll(&self, session: &str) -> Result<CheckResponse>;
}
