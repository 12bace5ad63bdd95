use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};

use common_auth::{TokenSigner, TokenVerifier};

use crate::auth_handlers::{login, register};
use crate::menu_handlers::{
    create_food, delete_food, list_foods, todays_menu, tomorrows_menu, update_food,
};
use crate::order_handlers::{
    create_order, list_all_orders, list_my_orders, update_order_status,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub token_signer: Arc<TokenSigner>,
    pub token_verifier: Arc<TokenVerifier>,
}

impl axum::extract::FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.token_verifier.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<TokenSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.token_signer.clone()
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub fn build_router(state: AppState) -> Router {
    let allowed_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
    ];
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static("authorization")]);

    Router::new()
        .route("/healthz", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/food/today", get(todays_menu))
        .route("/food/tomorrow", get(tomorrows_menu))
        .route("/food", post(create_food).get(list_foods))
        .route("/food/:food_id", put(update_food).delete(delete_food))
        .route("/orders", post(create_order).get(list_all_orders))
        .route("/orders/my", get(list_my_orders))
        .route("/orders/:order_id", put(update_order_status))
        .with_state(state)
        .layer(cors)
}
