//! Session handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Newly created session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create a session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = SessionResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, session) = state.create_session().await;
    let created_at = session.lock().await.created_at;
    info!(session_id = %id, "Session created");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: id,
            created_at,
        }),
    )
}

/// Delete a session and everything it holds
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.remove_session(id).await {
        info!(session_id = %id, "Session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id}")))
    }
}
