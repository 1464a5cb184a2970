use crate::domain::{User, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ユーザーリポジトリポート
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを登録する
    ///
    /// メールアドレスの重複は呼び出し側で事前に確認する。
    async fn insert(&self, user: User) -> Result<()>;

    /// メールアドレスでユーザーを取得する
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// IDでユーザーを取得する
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>>;
}
