use crate::domain::user::{MIN_PASSWORD_LENGTH, validate_registration};
use crate::domain::{RegistrationError, User, UserId};
use crate::ports::UserRepository;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use std::sync::Arc;

use super::errors::{AuthError, Result};
use super::token::{AccessToken, TokenIssuer};

/// サービスの依存関係
#[derive(Clone)]
pub struct AuthDependencies {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenIssuer>,
}

fn repository_error(e: Box<dyn std::error::Error + Send + Sync>) -> AuthError {
    AuthError::RepositoryError(e)
}

/// パスワードをArgon2でハッシュ化し、PHC文字列を返す
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::CryptoError(e.to_string()))
}

/// PHC文字列とパスワードを照合する（不正なハッシュは不一致扱い）
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// ユーザーを登録する
///
/// ビジネスルール：
/// - メールアドレスの形式が正しいこと
/// - パスワードが8文字以上であること
/// - メールアドレスが未登録であること
pub async fn register(deps: &AuthDependencies, email: &str, password: &str) -> Result<User> {
    let email = validate_registration(email, password).map_err(|e| match e {
        RegistrationError::InvalidEmail => AuthError::InvalidEmail,
        RegistrationError::PasswordTooShort => AuthError::PasswordTooShort(MIN_PASSWORD_LENGTH),
    })?;

    let existing = deps
        .users
        .find_by_email(&email)
        .await
        .map_err(repository_error)?;
    if existing.is_some() {
        return Err(AuthError::EmailAlreadyRegistered);
    }

    let user = User {
        user_id: UserId::new(),
        email,
        password_hash: hash_password(password)?,
        created_at: Utc::now(),
    };
    deps.users
        .insert(user.clone())
        .await
        .map_err(repository_error)?;

    tracing::info!(user_id = %user.user_id.value(), "User registered");
    Ok(user)
}

/// メールアドレスとパスワードでログインし、アクセストークンを発行する
pub async fn login(deps: &AuthDependencies, email: &str, password: &str) -> Result<AccessToken> {
    let user = deps
        .users
        .find_by_email(email.trim())
        .await
        .map_err(repository_error)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    deps.tokens.issue(user.user_id)
}

/// アクセストークンからユーザーを取得する
pub async fn current_user(deps: &AuthDependencies, token: &str) -> Result<User> {
    let user_id = deps.tokens.verify(token)?;
    deps.users
        .find_by_id(user_id)
        .await
        .map_err(repository_error)?
        .ok_or(AuthError::InvalidToken)
}
