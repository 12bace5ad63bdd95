use anyhow::{Context, Result};
use std::env;

use common_auth::TokenConfig;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub token_secret: String,
    pub token_config: TokenConfig,
    pub host: String,
    pub port: u16,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let token_secret =
        env::var("CANTEEN_JWT_SECRET").context("CANTEEN_JWT_SECRET must be set")?;

    let issuer =
        env::var("CANTEEN_JWT_ISSUER").unwrap_or_else(|_| "campus-canteen".to_string());

    let mut token_config = TokenConfig::new(issuer);
    if let Some(ttl) = i64_from_env("CANTEEN_TOKEN_TTL_SECONDS") {
        token_config = token_config.with_ttl(ttl);
    }
    if let Some(leeway) = u32_from_env("CANTEEN_JWT_LEEWAY_SECONDS") {
        token_config = token_config.with_leeway(leeway);
    }

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080);

    Ok(ServiceConfig {
        database_url,
        token_secret,
        token_config,
        host,
        port,
    })
}

fn i64_from_env(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

fn u32_from_env(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
