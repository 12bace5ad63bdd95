use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::error::AuthResult;
use crate::roles::Role;

/// Signs identity tokens with a shared HS256 secret. Stateless: nothing is
/// recorded server-side and expiry is the only way a token dies.
pub struct TokenSigner {
    config: TokenConfig,
    encoding_key: EncodingKey,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub token_type: &'static str,
}

impl TokenSigner {
    pub fn new(config: TokenConfig, secret: &[u8]) -> Self {
        Self {
            config,
            encoding_key: EncodingKey::from_secret(secret),
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue(&self, subject: Uuid, role: Role) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.ttl_seconds);

        let claims = AccessClaims {
            sub: subject.to_string(),
            role: role.as_str(),
            iss: &self.config.issuer,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.config.ttl_seconds,
            token_type: "Bearer",
        })
    }
}

#[derive(Serialize)]
struct AccessClaims<'a> {
    sub: String,
    role: &'a str,
    iss: &'a str,
    exp: i64,
    iat: i64,
}
