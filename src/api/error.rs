use crate::application::auth::AuthError;
use crate::application::goal::GoalApplicationError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Goal(GoalApplicationError),
    Auth(AuthError),
    /// リクエスト内容の不備
    BadRequest(String),
}

impl From<GoalApplicationError> for ApiError {
    fn from(err: GoalApplicationError) -> Self {
        ApiError::Goal(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

fn goal_error(err: GoalApplicationError) -> (StatusCode, &'static str, String) {
    match err {
        // 400 Bad Request - 入力の検証エラー
        GoalApplicationError::EmptyTitle => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Title must not be empty".to_string(),
        ),
        GoalApplicationError::InvalidStatus(status) => (
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS",
            format!("Invalid status '{}': expected unread, reading or done", status),
        ),

        // 404 Not Found
        GoalApplicationError::GoalNotFound => (
            StatusCode::NOT_FOUND,
            "GOAL_NOT_FOUND",
            "Goal not found".to_string(),
        ),
        GoalApplicationError::GoalBookNotFound => (
            StatusCode::NOT_FOUND,
            "GOAL_BOOK_NOT_FOUND",
            "Book not found in goal".to_string(),
        ),

        // 500 Internal Server Error - 詳細はログのみ
        GoalApplicationError::RepositoryError(e) => {
            tracing::error!("Goal repository error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred".to_string(),
            )
        }
    }
}

fn auth_error(err: AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::InvalidEmail | AuthError::PasswordTooShort(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        AuthError::EmailAlreadyRegistered => (
            StatusCode::BAD_REQUEST,
            "EMAIL_ALREADY_REGISTERED",
            err.to_string(),
        ),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            err.to_string(),
        ),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string()),
        AuthError::CryptoError(ref msg) => {
            tracing::error!("Credential processing error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred".to_string(),
            )
        }
        AuthError::RepositoryError(ref e) => {
            tracing::error!("User repository error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Goal(err) => goal_error(err),
            ApiError::Auth(err) => auth_error(err),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        let mut response = (status, body).into_response();
        // 401にはBearer認証を要求するヘッダを付ける
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = ApiError::from(GoalApplicationError::GoalNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_status_maps_to_400() {
        let response =
            ApiError::from(GoalApplicationError::InvalidStatus("finished".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_token_carries_www_authenticate() {
        let response = ApiError::from(AuthError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_repository_error_is_500() {
        let response =
            ApiError::from(GoalApplicationError::RepositoryError("connection reset".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
