use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, archive_goal, availability, create_goal, get_goal, health_check, list_goals, login,
    me, recommend, register, update_goal_book_status,
};

/// Creates the API router
///
/// - GET  /health
/// - POST /auth/register, POST /auth/login, GET /auth/me
/// - POST /recommend, POST /availability
/// - POST /goals, GET /goals/:id
/// - PATCH /goals/:id/books/:isbn13, PATCH /goals/:id/archive
/// - GET  /mypage/goals
pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // Lookup
        .route("/recommend", post(recommend))
        .route("/availability", post(availability))
        // Goals
        .route("/goals", post(create_goal))
        .route("/goals/:id", get(get_goal))
        .route("/goals/:id/books/:isbn13", patch(update_goal_book_status))
        .route("/goals/:id/archive", patch(archive_goal))
        .route("/mypage/goals", get(list_goals))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 許可オリジンのCORS設定（空ならすべて許可）
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}
