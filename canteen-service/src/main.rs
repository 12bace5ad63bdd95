use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::net::TcpListener;

use common_auth::{TokenSigner, TokenVerifier};

use canteen_service::app::{build_router, AppState};
use canteen_service::config::load_service_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_service_config()?;

    let db = PgPool::connect(&config.database_url).await?;

    let secret = config.token_secret.as_bytes();
    let token_signer = Arc::new(TokenSigner::new(config.token_config.clone(), secret));
    let token_verifier = Arc::new(TokenVerifier::new(config.token_config.clone(), secret));

    let state = AppState {
        db,
        token_signer,
        token_verifier,
    };
    let app = build_router(state);

    let ip: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    println!("starting canteen-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
