//! Chat handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::handlers::{require_session, MessageDto};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cosmo_chat::{ChatMode, ChatRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Where the message is answered from
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatModeDto {
    /// Keyword lookup over the session's cached triples
    #[default]
    KnowledgeBase,
    /// Search agent over the open web
    WebSearch,
    /// Search agent scoped to `url`
    UrlAnalysis,
}

/// Chat message request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub mode: ChatModeDto,

    #[schema(example = "What does INSAT monitor?")]
    pub message: String,

    /// Target page for `url_analysis`
    #[serde(default)]
    pub url: Option<String>,
}

impl ChatMessageRequest {
    fn into_request(self) -> ChatRequest {
        let mode = match self.mode {
            ChatModeDto::KnowledgeBase => ChatMode::KnowledgeBase,
            ChatModeDto::WebSearch => ChatMode::WebSearch,
            ChatModeDto::UrlAnalysis => ChatMode::UrlAnalysis {
                url: self.url.unwrap_or_default(),
            },
        };
        ChatRequest::new(mode, self.message)
    }
}

/// Assistant reply plus the full conversation
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: MessageDto,
    pub history: Vec<MessageDto>,
}

/// Conversation log of a session
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub messages: Vec<MessageDto>,
}

/// Send a chat message
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/chat",
    tag = "chat",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = crate::error::ApiError),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session = require_session(&state, id).await?;
    info!(session_id = %id, mode = ?request.mode, "Chat message received");

    let mut session = session.lock().await;
    let reply = state
        .assistant
        .send(&mut session, request.into_request())
        .await?;

    Ok(Json(ChatResponse {
        reply: MessageDto::from(&reply),
        history: session.log.messages().iter().map(MessageDto::from).collect(),
    }))
}

/// Get the conversation log
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/chat",
    tag = "chat",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Conversation log", body = HistoryResponse),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = require_session(&state, id).await?;
    let session = session.lock().await;

    Ok(Json(HistoryResponse {
        messages: session.log.messages().iter().map(MessageDto::from).collect(),
    }))
}

/// Clear the conversation log; the extraction cache is kept
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}/chat",
    tag = "chat",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "History cleared"),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, id).await?;
    state.assistant.clear_history(&mut *session.lock().await);
    info!(session_id = %id, "Chat history cleared");

    Ok(StatusCode::NO_CONTENT)
}
