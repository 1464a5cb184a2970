//! 起動時に一度だけ構築する設定
//!
//! 環境変数から `Settings` を組み立て、各コンポーネントのコンストラクタに渡す。
//! グローバルな遅延初期化は行わない。

use std::collections::HashMap;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

pub const DEFAULT_CALIL_BASE: &str = "https://api.calil.jp";
pub const DEFAULT_NDL_API_BASE: &str = "https://iss.ndl.go.jp/api/opensearch";
pub const DEFAULT_CINII_BASE: &str = "https://ci.nii.ac.jp/books/opensearch/search";
pub const DEFAULT_CITY: &str = "宮崎市";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// APIキーの未設定を表すプレースホルダ値
const APPKEY_PLACEHOLDER: &str = "replace_me";

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数がない
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub calil_appkey: Option<String>,
    pub calil_base: String,
    pub calil_max_polls: u32,
    pub default_city: String,
    pub ndl_api_base: String,
    pub cinii_base: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub allowed_origins: Vec<String>,
    pub http_timeout: Duration,
    pub redis_timeout: Duration,
    pub port: u16,
}

impl Settings {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// 変数マップから読み込む
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let optional = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| optional(name).unwrap_or_else(|| default.to_string());

        // 共有シークレットで署名するためHMAC系のみ受け付ける
        let jwt_algorithm = match optional("JWT_ALGORITHM") {
            Some(value) => match value.parse::<Algorithm>() {
                Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "JWT_ALGORITHM",
                        value,
                    });
                }
            },
            None => Algorithm::HS256,
        };

        let allowed_origins = or_default("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: optional("REDIS_URL"),
            calil_appkey: optional("CALIL_APPKEY"),
            calil_base: or_default("CALIL_BASE", DEFAULT_CALIL_BASE),
            calil_max_polls: parse_number(optional("CALIL_MAX_POLLS"), "CALIL_MAX_POLLS", 30)?,
            default_city: or_default("DEFAULT_CITY", DEFAULT_CITY),
            ndl_api_base: or_default("NDL_API_BASE", DEFAULT_NDL_API_BASE),
            cinii_base: or_default("CINII_BASE", DEFAULT_CINII_BASE),
            jwt_secret: required("JWT_SECRET")?,
            jwt_algorithm,
            allowed_origins,
            http_timeout: Duration::from_secs(parse_number(
                optional("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                20,
            )?),
            redis_timeout: Duration::from_millis(parse_number(
                optional("REDIS_TIMEOUT_MS"),
                "REDIS_TIMEOUT_MS",
                500,
            )?),
            port: parse_number(optional("PORT"), "PORT", 8000)?,
        })
    }

    /// 有効な所蔵照会APIキーがあれば返す
    ///
    /// 未設定、空白、プレースホルダ（大文字小文字を区別しない）は無効とみなす。
    pub fn valid_calil_appkey(&self) -> Option<&str> {
        self.calil_appkey
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.eq_ignore_ascii_case(APPKEY_PLACEHOLDER))
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgres://localhost/libremore".to_string(),
            ),
            ("JWT_SECRET".to_string(), "test-secret".to_string()),
        ])
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(base_vars()).unwrap();

        assert_eq!(settings.default_city, "宮崎市");
        assert_eq!(settings.calil_base, DEFAULT_CALIL_BASE);
        assert_eq!(settings.ndl_api_base, DEFAULT_NDL_API_BASE);
        assert_eq!(settings.cinii_base, DEFAULT_CINII_BASE);
        assert_eq!(settings.http_timeout, Duration::from_secs(20));
        assert_eq!(settings.redis_timeout, Duration::from_millis(500));
        assert_eq!(settings.calil_max_polls, 30);
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.jwt_algorithm, Algorithm::HS256);
        assert_eq!(settings.allowed_origins, vec!["http://localhost:3000"]);
        assert!(settings.redis_url.is_none());
        assert!(settings.valid_calil_appkey().is_none());
    }

    #[test]
    fn test_missing_required_variable() {
        let mut vars = base_vars();
        vars.remove("JWT_SECRET");
        assert_eq!(
            Settings::from_vars(vars).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn test_invalid_number() {
        let mut vars = base_vars();
        vars.insert("HTTP_TIMEOUT_SECS".to_string(), "twenty".to_string());
        assert!(matches!(
            Settings::from_vars(vars),
            Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_placeholder_appkey_is_not_valid() {
        for key in ["replace_me", "REPLACE_ME", "   "] {
            let mut vars = base_vars();
            vars.insert("CALIL_APPKEY".to_string(), key.to_string());
            let settings = Settings::from_vars(vars).unwrap();
            assert!(settings.valid_calil_appkey().is_none(), "{key:?}");
        }
    }

    #[test]
    fn test_real_appkey_is_valid() {
        let mut vars = base_vars();
        vars.insert("CALIL_APPKEY".to_string(), " abc123 ".to_string());
        let settings = Settings::from_vars(vars).unwrap();
        assert_eq!(settings.valid_calil_appkey(), Some("abc123"));
    }

    #[test]
    fn test_allowed_origins_split() {
        let mut vars = base_vars();
        vars.insert(
            "ALLOWED_ORIGINS".to_string(),
            "https://a.example, ,https://b.example".to_string(),
        );
        let settings = Settings::from_vars(vars).unwrap();
        assert_eq!(
            settings.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_jwt_algorithm_must_be_hmac() {
        let mut vars = base_vars();
        vars.insert("JWT_ALGORITHM".to_string(), "HS512".to_string());
        let settings = Settings::from_vars(vars.clone()).unwrap();
        assert_eq!(settings.jwt_algorithm, Algorithm::HS512);

        vars.insert("JWT_ALGORITHM".to_string(), "RS256".to_string());
        assert!(matches!(
            Settings::from_vars(vars),
            Err(ConfigError::Invalid {
                name: "JWT_ALGORITHM",
                ..
            })
        ));
    }
}
