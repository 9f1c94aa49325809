//! HTTP front end for the game review service.

mod config;
mod error;
mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use review_engine::{EnginePool, GameAnalyzer, StockfishSession};

use crate::config::Config;

pub(crate) type SharedAnalyzer = Arc<GameAnalyzer<StockfishSession>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::info!(
        stockfish_path = %config.engine.path,
        pool_size = config.pool_size,
        depth = config.options.depth,
        "starting review server"
    );

    let pool = EnginePool::spawn(&config.engine, config.pool_size).await?;
    let analyzer: SharedAnalyzer = Arc::new(GameAnalyzer::new(pool, config.options.clone()));

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/analyze", post(routes::analyze::analyze_game))
        .layer(Extension(analyzer.clone()))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down engine sessions");
    analyzer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
