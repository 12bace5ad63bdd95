use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderValue};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::verifier::TokenVerifier;

/// Extracts verified token claims from the request's bearer token.
///
/// This is the first half of the access gate: it proves the token is signed
/// and unexpired. Resolving the identity against the credential store is the
/// service's job, since the token does not carry the role authoritatively.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    fn from_header(verifier: &TokenVerifier, header: &HeaderValue) -> AuthResult<Self> {
        let token = bearer_token(header)?;
        let claims = verifier.verify(&token)?;
        Ok(Self { claims, token })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        AuthContext::from_header(&Arc::<TokenVerifier>::from_ref(state), header)
    }
}

/// Pulls the credential out of an `Authorization` header. The scheme is
/// matched case-insensitively per RFC 7235, surrounding whitespace is
/// tolerated, and anything after the credential rejects the header whole.
fn bearer_token(value: &HeaderValue) -> AuthResult<String> {
    let raw = value.to_str().map_err(|_| AuthError::InvalidAuthorization)?;

    let mut words = raw.split_whitespace();
    let scheme = words.next().ok_or(AuthError::InvalidAuthorization)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthorization);
    }

    let token = words.next().ok_or(AuthError::InvalidAuthorization)?;
    if words.next().is_some() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
