use thiserror::Error;

/// 読書目標アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum GoalApplicationError {
    /// タイトルが空白のみ
    #[error("Title must not be empty")]
    EmptyTitle,

    /// 読書ステータスが unread / reading / done のいずれでもない
    #[error("Invalid reading status: {0}")]
    InvalidStatus(String),

    /// 目標が存在しない、または他のユーザーのもの
    #[error("Goal not found")]
    GoalNotFound,

    /// 目標に指定のISBNの書籍がない
    #[error("Goal/book not found")]
    GoalBookNotFound,

    /// リポジトリのエラー
    #[error("Repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, GoalApplicationError>;
