use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::goal::{GoalDetail, GoalSummary};
use crate::application::recommendation::Recommendation;
use crate::domain::{AvailabilityStatus, Book, GoalBookEntry, GoalProgress, ReadingStatus, User};

// ============================================================================
// 共通
// ============================================================================

/// ヘルスチェックレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// 成功のみを返すレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// 認証
// ============================================================================

/// ユーザー登録リクエスト（POST /auth/register）
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// ログインフォーム（POST /auth/login、OAuth2パスワード形式）
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// メールアドレス
    pub username: String,
    pub password: String,
}

/// ログインユーザー（GET /auth/me）
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id.value(),
            email: user.email,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// 推薦・所蔵照会
// ============================================================================

/// 推薦リクエスト（POST /recommend）
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub purpose: String,
}

/// 書籍レスポンス（推薦結果と目標内の書籍で共通）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookResponse {
    pub isbn13: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub pubyear: Option<i32>,
    pub ndc: Option<String>,
    pub ndlc: Option<String>,
    pub reason: Option<String>,
}

impl From<Recommendation> for BookResponse {
    fn from(recommendation: Recommendation) -> Self {
        let book = recommendation.book;
        Self {
            isbn13: book.isbn13,
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            pubyear: book.pubyear,
            ndc: book.ndc,
            ndlc: book.ndlc,
            reason: recommendation.reason,
        }
    }
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            isbn13: book.isbn13,
            title: Some(book.title),
            author: book.author,
            publisher: book.publisher,
            pubyear: book.pubyear,
            ndc: book.ndc,
            ndlc: book.ndlc,
            reason: None,
        }
    }
}

/// 所蔵照会リクエスト（POST /availability）
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub isbns: Vec<String>,
    /// 省略時は既定の市区町村
    pub city: Option<String>,
}

/// 所蔵照会の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub isbn13: String,
    pub systemid: String,
    pub status: AvailabilityStatus,
    #[serde(rename = "opacUrl")]
    pub opac_url: Option<String>,
}

// ============================================================================
// 読書目標
// ============================================================================

/// 目標作成リクエスト（POST /goals）
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub recommended_isbns: Vec<String>,
}

/// 読書ステータス更新リクエスト（PATCH /goals/:id/books/:isbn13）
#[derive(Debug, Deserialize)]
pub struct UpdateBookStatusRequest {
    pub status: String,
}

/// アーカイブ切り替えリクエスト（PATCH /goals/:id/archive）
#[derive(Debug, Deserialize)]
pub struct ArchiveGoalRequest {
    pub archived: bool,
}

/// 目標一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListGoalsQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// 目標レスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived: bool,
    pub progress: f64,
    pub total_books: i64,
    pub done_books: i64,
}

impl From<GoalSummary> for GoalResponse {
    fn from(summary: GoalSummary) -> Self {
        let GoalSummary { goal, progress } = summary;
        Self {
            id: goal.goal_id.value(),
            title: goal.title,
            description: goal.description,
            due_date: goal.due_date,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
            archived: goal.archived,
            progress: progress.progress,
            total_books: progress.total_books,
            done_books: progress.done_books,
        }
    }
}

/// 目標内の書籍
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBookResponse {
    pub book: BookResponse,
    pub status: ReadingStatus,
    pub position: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<GoalBookEntry> for GoalBookResponse {
    fn from(entry: GoalBookEntry) -> Self {
        Self {
            book: BookResponse::from(entry.book),
            status: entry.status,
            position: entry.position,
            completed_at: entry.completed_at,
        }
    }
}

/// 目標詳細レスポンス（GET /goals/:id）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDetailResponse {
    #[serde(flatten)]
    pub goal: GoalResponse,
    pub books: Vec<GoalBookResponse>,
}

impl From<GoalDetail> for GoalDetailResponse {
    fn from(detail: GoalDetail) -> Self {
        Self {
            goal: GoalResponse::from(GoalSummary {
                goal: detail.goal,
                progress: detail.progress,
            }),
            books: detail.books.into_iter().map(GoalBookResponse::from).collect(),
        }
    }
}

/// 進捗レスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgressResponse {
    pub ok: bool,
    pub progress: f64,
    pub total_books: i64,
    pub done_books: i64,
}

impl From<GoalProgress> for GoalProgressResponse {
    fn from(progress: GoalProgress) -> Self {
        Self {
            ok: true,
            progress: progress.progress,
            total_books: progress.total_books,
            done_books: progress.done_books,
        }
    }
}

/// 目標一覧レスポンス（GET /mypage/goals）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalListResponse {
    pub items: Vec<GoalResponse>,
}
