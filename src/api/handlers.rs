use crate::application::auth::{
    AccessToken, AuthDependencies, login as execute_login, register as execute_register,
};
use crate::application::availability::{AvailabilityDependencies, check_availability};
use crate::application::goal::{
    CreateGoal, GoalDependencies, archive_goal as execute_archive_goal,
    create_goal as execute_create_goal, get_goal as execute_get_goal,
    list_goals as execute_list_goals, update_goal_book_status as execute_update_status,
};
use crate::application::recommendation::{
    DEFAULT_LIMIT, RecommendationDependencies, recommend as execute_recommend,
};
use crate::domain::GoalId;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    extract::CurrentUser,
    types::{
        ArchiveGoalRequest, AvailabilityRequest, AvailabilityResponse, BookResponse,
        CreateGoalRequest, GoalDetailResponse, GoalListResponse, GoalProgressResponse,
        GoalResponse, HealthResponse, ListGoalsQuery, LoginForm, OkResponse, RecommendRequest,
        RegisterRequest, UpdateBookStatusRequest, UserResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthDependencies,
    pub goals: GoalDependencies,
    pub availability: AvailabilityDependencies,
    pub recommendation: RecommendationDependencies,
    /// 所蔵照会で市区町村が省略されたときに使う
    pub default_city: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Auth
// ============================================================================

/// POST /auth/register - ユーザー登録
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    execute_register(&state.auth, &req.email, &req.password).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// POST /auth/login - ログインしてアクセストークンを取得
///
/// OAuth2パスワード形式のフォーム（`username` にメールアドレス）。
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AccessToken>, ApiError> {
    let token = execute_login(&state.auth, &form.username, &form.password).await?;
    Ok(Json(token))
}

/// GET /auth/me - ログイン中のユーザー
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

// ============================================================================
// Recommendation / availability
// ============================================================================

/// POST /recommend - 目的文から書籍を推薦
///
/// 外部フィードの障害時も空の結果を返し、エラーにはしない。
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendRequest>,
) -> Json<Vec<BookResponse>> {
    let books = execute_recommend(&state.recommendation, &req.purpose, DEFAULT_LIMIT).await;
    Json(books.into_iter().map(BookResponse::from).collect())
}

/// POST /availability - 図書館の所蔵状況
///
/// 各行にOPACの検索URL（不明ならnull）を付ける。
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Vec<AvailabilityResponse>>, ApiError> {
    if req.isbns.is_empty() {
        return Err(ApiError::BadRequest(
            "isbns must contain at least one ISBN".to_string(),
        ));
    }

    let city = req
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .unwrap_or(state.default_city.as_str());

    let rows = check_availability(&state.availability, &req.isbns, city).await;
    let directory = &state.availability.directory;
    let response = rows
        .into_iter()
        .map(|row| AvailabilityResponse {
            opac_url: directory.opac_url(&row.systemid, &row.isbn13),
            isbn13: row.isbn13,
            systemid: row.systemid,
            status: row.status,
        })
        .collect();

    Ok(Json(response))
}

// ============================================================================
// Goals
// ============================================================================

/// POST /goals - 読書目標を作成
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    let input = CreateGoal {
        title: req.title,
        description: req.description,
        due_date: req.due_date,
        isbns: req.recommended_isbns,
    };
    let summary = execute_create_goal(&state.goals, user.user_id, input).await?;
    Ok(Json(GoalResponse::from(summary)))
}

/// GET /goals/:id - 目標の詳細（書籍は並び順）
pub async fn get_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalDetailResponse>, ApiError> {
    let detail = execute_get_goal(&state.goals, user.user_id, GoalId::from_uuid(goal_id)).await?;
    Ok(Json(GoalDetailResponse::from(detail)))
}

/// PATCH /goals/:id/books/:isbn13 - 読書ステータスを更新
pub async fn update_goal_book_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path((goal_id, isbn13)): Path<(Uuid, String)>,
    Json(req): Json<UpdateBookStatusRequest>,
) -> Result<Json<GoalProgressResponse>, ApiError> {
    let progress = execute_update_status(
        &state.goals,
        user.user_id,
        GoalId::from_uuid(goal_id),
        &isbn13,
        &req.status,
    )
    .await?;
    Ok(Json(GoalProgressResponse::from(progress)))
}

/// PATCH /goals/:id/archive - アーカイブ状態を変更
pub async fn archive_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(goal_id): Path<Uuid>,
    Json(req): Json<ArchiveGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    let summary = execute_archive_goal(
        &state.goals,
        user.user_id,
        GoalId::from_uuid(goal_id),
        req.archived,
    )
    .await?;
    Ok(Json(GoalResponse::from(summary)))
}

/// GET /mypage/goals - 自分の目標一覧（新しい順）
///
/// クエリパラメータ:
/// - include_archived: アーカイブ済みも含める（既定はfalse）
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListGoalsQuery>,
) -> Result<Json<GoalListResponse>, ApiError> {
    let items = execute_list_goals(&state.goals, user.user_id, query.include_archived).await?;
    Ok(Json(GoalListResponse {
        items: items.into_iter().map(GoalResponse::from).collect(),
    }))
}
