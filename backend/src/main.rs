mod auth;
mod db;
mod domain;
mod error;
mod rest;
mod store;

use anyhow::Result;
use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::auth::TokenKeys;
use crate::db::DbConnection;
use crate::rest::AppState;

const BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db = DbConnection::init().await?;
    info!("Database ready");

    let state = AppState::new(db, TokenKeys::from_env());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", rest::api_router(state))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    info!("Listening on {}", BIND_ADDR);
    axum::serve(listener, app).await?;

    Ok(())
}
