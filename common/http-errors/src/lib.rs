use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Service-level request failure. Renders a `{code, ...}` JSON body with the
/// machine-readable code mirrored into an `X-Error-Code` header so proxies
/// and tests can match on it without parsing the body.
#[derive(Debug)]
pub enum ApiError {
    /// Caller is authenticated but lacks the single role the route demands.
    ForbiddenMissingRole { role: &'static str },
    /// Caller is authenticated but outside the allowed role set.
    Forbidden,
    BadRequest { code: &'static str, message: Option<String> },
    NotFound { code: &'static str },
    Internal { message: Option<String> },
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal { message: Some(e.to_string()) }
    }

    pub fn bad_request(code: &'static str) -> Self {
        Self::BadRequest { code, message: None }
    }

    pub fn not_found(code: &'static str) -> Self {
        Self::NotFound { code }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ForbiddenMissingRole { .. } | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ForbiddenMissingRole { .. } => "missing_role",
            ApiError::Forbidden => "forbidden",
            ApiError::BadRequest { code, .. } | ApiError::NotFound { code } => code,
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_role: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = ErrorBody {
            code,
            missing_role: match &self {
                ApiError::ForbiddenMissingRole { role } => Some(role),
                _ => None,
            },
            message: match self {
                ApiError::BadRequest { message, .. } | ApiError::Internal { message } => message,
                _ => None,
            },
        };

        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
