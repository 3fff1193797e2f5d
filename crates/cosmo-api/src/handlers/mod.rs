//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod chat;
pub mod explore;
pub mod graph;
pub mod health;
pub mod sessions;

use chrono::{DateTime, Utc};
use cosmo_core::{ChatMessage, ChatRole, EntityPair, MessageKind, Triple};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, SharedSession};

/// Run CPU-bound work (extraction, layout, SVG) off the async workers
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> cosmo_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Worker task failed: {e}")))?
        .map_err(AppError::from)
}

/// Look up a session or fail with 404
pub(crate) async fn require_session(
    state: &AppState,
    id: Uuid,
) -> Result<SharedSession, AppError> {
    state
        .session(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id}")))
}

/// Co-occurrence pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PairDto {
    #[schema(example = "ISRO")]
    pub source: String,
    #[schema(example = "India")]
    pub target: String,
}

impl From<EntityPair> for PairDto {
    fn from(pair: EntityPair) -> Self {
        Self {
            source: pair.source,
            target: pair.target,
        }
    }
}

impl From<PairDto> for EntityPair {
    fn from(dto: PairDto) -> Self {
        EntityPair::new(dto.source, dto.target)
    }
}

/// Subject, predicate, object
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripleDto {
    #[schema(example = "INSAT")]
    pub subject: String,
    #[schema(example = "monitor")]
    pub predicate: String,
    #[schema(example = "Sea")]
    pub object: String,
}

impl From<Triple> for TripleDto {
    fn from(triple: Triple) -> Self {
        Self {
            subject: triple.subject,
            predicate: triple.predicate,
            object: triple.object,
        }
    }
}

impl From<TripleDto> for Triple {
    fn from(dto: TripleDto) -> Self {
        Triple::new(dto.subject, dto.predicate, dto.object)
    }
}

/// One conversation entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageDto {
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
    /// `plain` or `url_derived`
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ChatMessage> for MessageDto {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        let kind = match message.kind {
            MessageKind::Plain => "plain",
            MessageKind::UrlDerived => "url_derived",
        };
        Self {
            role: role.to_string(),
            content: message.content.clone(),
            kind: kind.to_string(),
            created_at: message.created_at,
        }
    }
}
