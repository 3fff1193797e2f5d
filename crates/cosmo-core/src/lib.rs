//! Cosmo Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Cosmo:
//! - Knowledge models (entity pairs, relation triples)
//! - Conversation records for the chat assistant
//! - Common error types
//! - The search agent capability trait
//! - Configuration management

pub mod config;

pub use config::{
    AgentConfig, AppConfig, ConfigError, FetchConfig, LoggingConfig, RenderConfig, ServerConfig,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Cosmo operations
#[derive(Error, Debug)]
pub enum CosmoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Agent error: {0}")]
    AgentError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CosmoError>;

// ============================================================================
// Knowledge Models
// ============================================================================

/// Label carried by every co-occurrence edge
pub const RELATED_LABEL: &str = "related";

/// Two entities mentioned in the same sentence.
///
/// Stored ordered: `(A, B)` and `(B, A)` are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityPair {
    pub source: String,
    pub target: String,
}

impl EntityPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Relation label of a co-occurrence pair
    pub fn label(&self) -> &'static str {
        RELATED_LABEL
    }
}

/// A relationship triple (Subject, Predicate, Object)
///
/// The predicate is the base form of the sentence's root verb.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Case-insensitive check whether any field occurs inside `text`
    pub fn mentioned_in(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        [&self.subject, &self.object, &self.predicate]
            .iter()
            .any(|field| haystack.contains(&field.to_lowercase()))
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {} → {}", self.subject, self.predicate, self.object)
    }
}

// ============================================================================
// Conversation Models
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Origin of a chat message's content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Plain,
    /// Produced by the web search agent
    UrlDerived,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::UrlDerived => write!(f, "url_derived"),
        }
    }
}

/// One entry of a conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message typed by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            kind: MessageKind::Plain,
            created_at: Utc::now(),
        }
    }

    /// Create an assistant reply
    pub fn assistant(content: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Failure of the external search agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AgentError {
    pub message: String,
}

impl AgentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<AgentError> for CosmoError {
    fn from(err: AgentError) -> Self {
        CosmoError::AgentError(err.message)
    }
}

/// One question handed to a search agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    /// The user's own words; this is what a web search looks up
    pub query: String,
    /// Full task description for the analysis model
    pub instruction: String,
    /// Page to analyse instead of searching the web
    pub url: Option<String>,
}

impl AgentRequest {
    pub fn new(query: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            instruction: instruction.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// External web search / analysis capability
#[async_trait::async_trait]
pub trait SearchAgent: Send + Sync {
    /// Answer a request, searching the web or focusing on its URL
    async fn search(&self, request: &AgentRequest) -> std::result::Result<String, AgentError>;

    /// Agent name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
