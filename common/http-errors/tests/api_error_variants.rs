use axum::http::StatusCode;
use axum::response::IntoResponse;
use common_http_errors::ApiError;

#[test]
fn forbidden_missing_role_variant() {
    let err = ApiError::ForbiddenMissingRole { role: "staff" };
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "missing_role");
}

#[test]
fn forbidden_variant() {
    let resp = ApiError::Forbidden.into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "forbidden");
}

#[test]
fn bad_request_carries_its_code() {
    let err = ApiError::bad_request("invalid_transition");
    assert_eq!(err.code(), "invalid_transition");
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get("X-Error-Code").unwrap(),
        "invalid_transition"
    );
}

#[test]
fn not_found_carries_its_code() {
    let resp = ApiError::not_found("food_not_found").into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "food_not_found");
}

#[test]
fn internal_variant() {
    let resp = ApiError::internal("boom").into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "internal_error");
}
