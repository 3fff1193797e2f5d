//! Per-user session state
//!
//! A session owns the conversation log and the extraction cache. Nothing is
//! shared between sessions and nothing outlives the session.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use uuid::Uuid;

use cosmo_core::{ChatMessage, Triple};

/// Append-only list of chat messages
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Triples of the most recent successful extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractionCache {
    triples: IndexSet<Triple>,
    updated_at: Option<DateTime<Utc>>,
}

impl ExtractionCache {
    /// Replace the cached triples wholesale
    pub fn replace(&mut self, triples: IndexSet<Triple>) {
        self.triples = triples;
        self.updated_at = Some(Utc::now());
    }

    pub fn triples(&self) -> &IndexSet<Triple> {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Time of the last replacement, if any
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// One user's exploration and chat state
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub log: ConversationLog,
    pub cache: ExtractionCache,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            log: ConversationLog::default(),
            cache: ExtractionCache::default(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
