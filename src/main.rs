mod aggregate;
mod cache;
mod config;
mod error;
mod filter;
mod loader;
mod models;
mod processor;
mod routes;
mod templates;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{cache::CatalogCache, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: CatalogCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,titleboard=debug,tower_http=info".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    let catalog = CatalogCache::new(config.catalog_path.clone());

    // Warm the cache so a missing file shows up in the logs at startup.
    match catalog.table() {
        Ok(table) => tracing::info!(rows = table.len(), path = %catalog.path().display(), "catalog loaded"),
        Err(err) => tracing::error!(error = %err, "catalog unavailable, serving empty dashboard"),
    }

    let state = Arc::new(AppState { config: config.clone(), catalog });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/titles", get(routes::titles))
        .route("/api/summary", get(routes::summary))
        .route("/api/report", get(routes::report))
        .route("/healthz", get(routes::healthz))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
