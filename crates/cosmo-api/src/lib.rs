//! Cosmo API - REST server for the knowledge explorer
//!
//! Exposes sessions, document/URL exploration, chat and graph rendering
//! over HTTP. The OpenAPI document is served at `/api-docs/openapi.json`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::handlers::{chat, explore, graph, health, sessions};
use crate::state::AppState;
use cosmo_core::config::ServerConfig;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cosmo Knowledge Explorer API",
        description = "Entity and relation extraction, knowledge graphs and chat over MOSDAC content"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        health::metrics,
        sessions::create_session,
        sessions::delete_session,
        explore::explore_upload,
        explore::explore_url,
        chat::send_message,
        chat::get_history,
        chat::clear_history,
        graph::render_graph,
    ),
    components(schemas(
        error::ApiError,
        health::HealthResponse,
        health::ReadinessResponse,
        health::ReadinessChecks,
        health::MetricsResponse,
        sessions::SessionResponse,
        explore::UploadRequest,
        explore::UrlRequest,
        explore::ExplorationResponse,
        handlers::PairDto,
        handlers::TripleDto,
        handlers::MessageDto,
        chat::ChatModeDto,
        chat::ChatMessageRequest,
        chat::ChatResponse,
        chat::HistoryResponse,
        graph::RenderRequest,
    )),
    tags(
        (name = "health", description = "Liveness, readiness and metrics"),
        (name = "sessions", description = "Per-user conversation and extraction state"),
        (name = "explore", description = "Knowledge extraction from uploads and web pages"),
        (name = "chat", description = "Knowledge base questions, web search and URL analysis"),
        (name = "graph", description = "Knowledge graph rendering"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = state.config.server.clone();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", routes::api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(cors_layer(&server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from config: no CORS headers when disabled, any origin when
/// no origins are listed
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if !server.cors_enabled {
        return CorsLayer::new();
    }

    let origin = if server.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router over default configuration, for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    let state = AppState::new(cosmo_core::AppConfig::default())
        .expect("default configuration is valid");
    create_router(Arc::new(state))
}
