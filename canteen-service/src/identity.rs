use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::FromRow;
use tracing::error;
use uuid::Uuid;

use common_auth::{ensure_role, AuthContext, AuthError, GuardError, Role};
use common_http_errors::ApiError;

use crate::app::AppState;

pub const STUDENT_ONLY: &[Role] = &[Role::Student];
pub const STAFF_ONLY: &[Role] = &[Role::Staff];

/// The authenticated caller, with the role re-resolved from the credential
/// store on every request. The token's embedded role is never trusted for
/// authorization: a deleted identity or a changed role takes effect
/// immediately, token expiry notwithstanding.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

#[derive(FromRow)]
struct IdentityRow {
    id: Uuid,
    username: String,
    role: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;

        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, username, role FROM users WHERE id = $1",
        )
        .bind(auth.claims.subject)
        .fetch_optional(&state.db)
        .await
        .map_err(|err| {
            error!(subject = %auth.claims.subject, error = %err, "credential lookup failed");
            AuthError::Store(err.to_string())
        })?
        .ok_or(AuthError::UnknownIdentity)?;

        let role = row
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidClaim("role", row.role.clone()))?;

        Ok(CurrentUser {
            id: row.id,
            username: row.username,
            role,
        })
    }
}

/// Role gate for a handler: composes after authentication, rejecting callers
/// whose current role is outside the allowed set.
pub fn require_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), ApiError> {
    ensure_role(user.role, allowed).map_err(|err| {
        let GuardError::Forbidden { required } = err;
        match required.as_slice() {
            [only] => ApiError::ForbiddenMissingRole { role: only.as_str() },
            _ => ApiError::Forbidden,
        }
    })
}
