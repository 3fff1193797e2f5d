//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{chat, explore, graph, sessions};
use crate::state::AppState;
use axum::{
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Session endpoints
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/:id", delete(sessions::delete_session))
        // Exploration endpoints
        .route("/sessions/:id/explore/upload", post(explore::explore_upload))
        .route("/sessions/:id/explore/url", post(explore::explore_url))
        // Chat endpoints
        .route(
            "/sessions/:id/chat",
            post(chat::send_message)
                .get(chat::get_history)
                .delete(chat::clear_history),
        )
        // Graph endpoints
        .route("/graph/render", post(graph::render_graph))
}
