use crate::domain::{Book, Goal, GoalBook, GoalBookEntry, GoalId, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// ISBNで書籍を取得する
    async fn find_by_isbn(&self, isbn13: &str) -> Result<Option<Book>>;

    /// 書籍を登録する
    async fn insert(&self, book: Book) -> Result<()>;
}

/// 読書目標リポジトリポート
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// 目標を保存する（upsert）
    async fn save(&self, goal: Goal) -> Result<()>;

    /// IDで目標を取得する
    async fn get_by_id(&self, goal_id: GoalId) -> Result<Option<Goal>>;

    /// ユーザーの目標を作成日時の新しい順に取得する
    ///
    /// `include_archived` がfalseならアーカイブ済みを除く。
    async fn find_by_user(&self, user_id: UserId, include_archived: bool) -> Result<Vec<Goal>>;

    /// 目標に紐づく書籍の関連を取得する
    async fn goal_books(&self, goal_id: GoalId) -> Result<Vec<GoalBook>>;

    /// 新しい目標とその書籍の関連をまとめて登録する
    ///
    /// どちらかの書き込みが失敗したら何も残さない。
    async fn create_with_books(&self, goal: Goal, goal_books: Vec<GoalBook>) -> Result<()>;

    /// 目標と書籍の関連を保存する（(goal_id, book_id) でupsert）
    async fn save_goal_books(&self, goal_books: Vec<GoalBook>) -> Result<()>;

    /// 書籍情報付きで目標内の書籍を並び順に取得する
    async fn goal_book_entries(&self, goal_id: GoalId) -> Result<Vec<GoalBookEntry>>;

    /// ISBNで目標内の書籍の関連を取得する
    async fn find_goal_book_by_isbn(
        &self,
        goal_id: GoalId,
        isbn13: &str,
    ) -> Result<Option<GoalBook>>;

    /// 目標の (総冊数, 読了冊数) を数える
    async fn count_progress(&self, goal_id: GoalId) -> Result<(i64, i64)>;
}
