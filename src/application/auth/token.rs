use crate::domain::UserId;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuthError, Result};

/// アクセストークンの有効期間（時間）
pub const TOKEN_LIFETIME_HOURS: i64 = 12;

/// JWTのクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザーID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// ログイン応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// 共有シークレットでJWTを発行・検証する
#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// ユーザーのアクセストークンを発行する
    pub fn issue(&self, user_id: UserId) -> Result<AccessToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.value().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::CryptoError(e.to_string()))?;

        Ok(AccessToken {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }

    /// トークンを検証してユーザーIDを取り出す（署名・有効期限を確認）
    pub fn verify(&self, token: &str) -> Result<UserId> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(self.algorithm))
            .map_err(|e| {
                tracing::debug!("Rejected access token: {}", e);
                AuthError::InvalidToken
            })?;
        let uuid = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(UserId::from_uuid(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("secret", Algorithm::HS256);
        let user_id = UserId::new();

        let token = issuer.issue(user_id).unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(issuer.verify(&token.access_token).unwrap(), user_id);
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = TokenIssuer::new("secret", Algorithm::HS256)
            .issue(UserId::new())
            .unwrap();
        let other = TokenIssuer::new("another-secret", Algorithm::HS256);
        assert!(matches!(
            other.verify(&token.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let issuer = TokenIssuer::new("secret", Algorithm::HS256);
        let past = Utc::now() - Duration::hours(13);
        let claims = Claims {
            sub: UserId::new().value().to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let issuer = TokenIssuer::new("secret", Algorithm::HS256);
        assert!(matches!(issuer.verify("not-a-jwt"), Err(AuthError::InvalidToken)));
    }
}
