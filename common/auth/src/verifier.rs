use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::TokenConfig;
use crate::error::AuthResult;

/// Verifies HS256 identity tokens against the shared secret and expected
/// issuer. Expiry is checked against the configured leeway (zero by default,
/// so a token is dead the instant its exp passes).
#[derive(Clone)]
pub struct TokenVerifier {
    config: TokenConfig,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(config: TokenConfig, secret: &[u8]) -> Self {
        Self {
            config,
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<Value>(token, &self.decoding_key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = %claims.subject, "verified token successfully");
        Ok(claims)
    }
}
