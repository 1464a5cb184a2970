use crate::application::auth::{AuthError, current_user};
use crate::domain::User;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use super::{error::ApiError, handlers::AppState};

/// Bearerトークンで認証されたユーザー
///
/// トークンがない・不正・期限切れ、またはユーザーが存在しない場合は401を返す。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// `Authorization: Bearer <token>` からトークンを取り出す
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::InvalidToken)?;
        let user = current_user(&state.auth, token).await?;
        Ok(CurrentUser(user))
    }
}
