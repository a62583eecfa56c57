//! Oakline Server - order lifecycle and entitlement engine.
//!
//! Serves the storefront's order and review API. Catalog CRUD, page
//! rendering, and account registration are owned by other components; this
//! binary only reads their tables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use oakline_server::{AppState, ServerConfig, routes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info level for our
    // crate if RUST_LOG is not set.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "oakline_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    let pool = oakline_server::db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p ol-cli -- migrate

    let addr = config.socket_addr();
    let state = AppState::new(&config, pool);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Oakline server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
