use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RegistrationError, UserId};

/// パスワードの最小文字数
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// ユーザー
///
/// パスワードはハッシュ（PHC文字列）でのみ保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 純粋関数：登録内容を検証し、正規化したメールアドレスを返す
///
/// ビジネスルール：
/// - メールアドレスは `local@domain` の形で、domainに `.` を含む
/// - パスワードは8文字以上
pub fn validate_registration(email: &str, password: &str) -> Result<String, RegistrationError> {
    let email = email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid_email {
        return Err(RegistrationError::InvalidEmail);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(RegistrationError::PasswordTooShort);
    }

    Ok(email.to_string())
}
