//! Request tracking middleware
//!
//! Counts every request on `AppState` and logs its latency per route,
//! with session IDs collapsed to `:id`.
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let endpoint = normalize_endpoint(request.uri().path());
    state.increment_requests();

    let response = next.run(request).await;

    debug!(
        %method,
        endpoint = %endpoint,
        status = response.status().as_u16(),
        latency_us = start.elapsed().as_micros() as u64,
        "Request completed"
    );

    response
}

/// Replace UUID segments with a placeholder so one route logs under one name
fn normalize_endpoint(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if Uuid::parse_str(seg).is_ok() {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
