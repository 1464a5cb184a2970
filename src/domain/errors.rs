/// 読書目標作成のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateGoalError {
    /// タイトルが空
    EmptyTitle,
}

/// ユーザー登録のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// メールアドレスの形式が不正
    InvalidEmail,
    /// パスワードが短すぎる
    PasswordTooShort,
}
