use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{error, warn};
use uuid::Uuid;

use common_auth::Role;

use crate::app::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct CredentialError {
    status: StatusCode,
    body: ErrorResponse,
}

impl CredentialError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse { code, message: message.into() },
        }
    }

    fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            "Invalid credentials. Please try again.",
        )
    }

    fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Persona the client believes it is logging into. When present it must
    /// match the stored role or the login is refused outright.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub role: Role,
    pub expires_in: i64,
    pub token_type: &'static str,
}

impl TokenResponse {
    fn new(issued: common_auth::IssuedToken, role: Role) -> Self {
        Self {
            token: issued.token,
            role,
            expires_in: issued.expires_in,
            token_type: issued.token_type,
        }
    }
}

#[derive(FromRow)]
struct AuthRow {
    id: Uuid,
    role: String,
    password_hash: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, CredentialError> {
    let RegisterRequest { username, password, role } = new_user;

    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(CredentialError::validation(
            "invalid_username",
            "Username must not be empty",
        ));
    }

    let role = role.parse::<Role>().map_err(|_| {
        CredentialError::validation(
            "invalid_role",
            format!(
                "Unsupported role '{role}'. Allowed roles: {}",
                Role::ALL
                    .iter()
                    .map(|value| value.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    })?;

    let password_hash = hash_password(&password)?;
    let user_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, role) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(&username)
    .bind(&password_hash)
    .bind(role.as_str())
    .execute(&state.db)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            CredentialError::validation("username_taken", "Username is already registered")
        } else {
            error!(username = %username, error = %err, "failed to create user");
            CredentialError::internal_error("Failed to create user")
        }
    })?;

    let issued = state.token_signer.issue(user_id, role).map_err(|err| {
        error!(user_id = %user_id, error = %err, "failed to issue token");
        CredentialError::internal_error("Unable to issue authentication token.")
    })?;

    Ok(Json(TokenResponse::new(issued, role)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, CredentialError> {
    let LoginRequest { username, password, role: requested_role } = login;

    let auth_data = sqlx::query_as::<_, AuthRow>(
        "SELECT id, role, password_hash FROM users WHERE username = $1",
    )
    .bind(&username)
    .fetch_optional(&state.db)
    .await
    .map_err(|err| CredentialError::internal_error(format!("DB query failed: {err}")))?
    .ok_or_else(CredentialError::invalid_credentials)?;

    let password_valid = match PasswordHash::new(&auth_data.password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(err) => {
            warn!(user_id = %auth_data.id, error = %err, "stored password hash is unreadable");
            false
        }
    };

    if !password_valid {
        return Err(CredentialError::invalid_credentials());
    }

    let role = auth_data.role.parse::<Role>().map_err(|_| {
        error!(user_id = %auth_data.id, role = %auth_data.role, "stored role is not recognised");
        CredentialError::internal_error("Account is misconfigured")
    })?;

    // The requested persona must match the stored role. A mismatch is
    // indistinguishable from a wrong password on the wire.
    if let Some(requested) = requested_role {
        match requested.parse::<Role>() {
            Ok(parsed) if parsed == role => {}
            _ => return Err(CredentialError::invalid_credentials()),
        }
    }

    let issued = state.token_signer.issue(auth_data.id, role).map_err(|err| {
        error!(user_id = %auth_data.id, error = %err, "failed to issue token");
        CredentialError::internal_error("Unable to issue authentication token.")
    })?;

    Ok(Json(TokenResponse::new(issued, role)))
}

fn hash_password(password: &str) -> Result<String, CredentialError> {
    if password.trim().is_empty() {
        return Err(CredentialError::validation(
            "invalid_password",
            "Password must not be empty",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CredentialError::internal_error(format!("Failed to hash password: {err}")))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_reports_lifetime_and_type() {
        let signer = common_auth::TokenSigner::new(
            common_auth::TokenConfig::new("campus-canteen"),
            b"handler-secret",
        );
        let issued = signer.issue(Uuid::new_v4(), Role::Student).expect("issue");

        let body = serde_json::to_value(TokenResponse::new(issued, Role::Student)).expect("json");
        assert_eq!(body["role"], "student");
        assert_eq!(body["expiresIn"], 3600);
        assert_eq!(body["tokenType"], "Bearer");
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn hash_password_rejects_blank() {
        assert!(hash_password("   ").is_err());
    }

    #[test]
    fn hash_password_round_trips() {
        let hash = hash_password("hunter2").expect("hash");
        let parsed = PasswordHash::new(&hash).expect("parse");
        Argon2::default()
            .verify_password(b"hunter2", &parsed)
            .expect("verify");
        assert!(Argon2::default()
            .verify_password(b"wrong", &parsed)
            .is_err());
    }
}
