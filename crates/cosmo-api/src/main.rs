//! Cosmo API Server
//!
//! REST API server for the knowledge explorer.
//!
//! Author: hephaex@gmail.com

use cosmo_api::{create_router, state::AppState};
use cosmo_core::config::AppConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = &config.logging.level;
            format!("cosmo_api={level},tower_http={level}").into()
        });
    if config.logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config)?);

    // Sweep idle sessions even when no request touches the session map
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            sweeper.evict_idle_sessions(Instant::now()).await;
        }
    });

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Cosmo API Server starting on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
