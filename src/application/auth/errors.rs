use thiserror::Error;

/// 認証アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum AuthError {
    /// メールアドレスの形式が不正
    #[error("Invalid email address")]
    InvalidEmail,

    /// パスワードが短すぎる
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    /// 登録済みのメールアドレス
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// メールアドレスまたはパスワードが違う
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// トークンがない・不正・期限切れ、またはユーザーが存在しない
    #[error("Could not validate credentials")]
    InvalidToken,

    /// パスワードハッシュ・トークン署名の失敗
    #[error("Credential processing error: {0}")]
    CryptoError(String),

    /// リポジトリのエラー
    #[error("Repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, AuthError>;
