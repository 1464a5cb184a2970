use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// キャッシュストアポート
///
/// 外部ルックアップ結果をTTL付きで保存するキー・バリューストア。
/// 呼び出し側はキャッシュを任意の存在として扱い、エラーはミスと同じに扱う。
/// 実装（Redis / 何もしないストア）は起動時に選択される。
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// キーに対応する値を取得する（存在しなければNone）
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 値をTTL付きで保存する
    ///
    /// 同じキーへの同じ値の再書き込みは安全（冪等）。
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}
