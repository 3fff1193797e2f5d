//! Chat dispatch
//!
//! Three modes share one conversation log: knowledge base questions answered
//! from the extraction cache, web searches and URL analyses delegated to the
//! search agent.

use std::sync::Arc;

use tracing::{debug, warn};

use cosmo_core::{AgentRequest, ChatMessage, CosmoError, MessageKind, Result, SearchAgent};

use crate::matcher::match_query;
use crate::session::Session;

pub const AGENT_NOT_CONFIGURED_REPLY: &str =
    "Firecrawl API key not configured. Please set FIRECRAWL_API_KEY in your environment.";

pub const MISSING_URL_REPLY: &str = "Please enter a URL to analyze!";

/// Where a chat message is answered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMode {
    KnowledgeBase,
    WebSearch,
    UrlAnalysis { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub mode: ChatMode,
    pub message: String,
}

impl ChatRequest {
    pub fn new(mode: ChatMode, message: impl Into<String>) -> Self {
        Self {
            mode,
            message: message.into(),
        }
    }
}

pub fn web_search_instruction(query: &str) -> String {
    format!("Search the web and analyze information about: {query}")
}

pub fn url_analysis_instruction(url: &str, query: &str) -> String {
    format!("Extract and analyze information from {url} related to: {query}")
}

/// Answers chat messages for a session
#[derive(Clone, Default)]
pub struct Assistant {
    agent: Option<Arc<dyn SearchAgent>>,
}

impl Assistant {
    /// `agent` is `None` when the search agent is not configured
    pub fn new(agent: Option<Arc<dyn SearchAgent>>) -> Self {
        Self { agent }
    }

    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Append the user message and the reply to the log; returns the reply
    pub async fn send(&self, session: &mut Session, request: ChatRequest) -> Result<ChatMessage> {
        let query = request.message.trim();
        if query.is_empty() {
            return Err(CosmoError::ValidationError(
                "Message must not be empty".to_string(),
            ));
        }

        session.log.push(ChatMessage::user(query));

        let reply = match &request.mode {
            ChatMode::KnowledgeBase => {
                let outcome = match_query(query, &session.cache);
                debug!(session_id = %session.id, outcome = ?outcome, "Knowledge base query");
                ChatMessage::assistant(outcome.to_reply(), MessageKind::Plain)
            }
            ChatMode::WebSearch => {
                let request = AgentRequest::new(query, web_search_instruction(query));
                let answer = self.delegate(&request).await;
                ChatMessage::assistant(answer, MessageKind::UrlDerived)
            }
            ChatMode::UrlAnalysis { url } if url.trim().is_empty() => {
                ChatMessage::assistant(MISSING_URL_REPLY, MessageKind::Plain)
            }
            ChatMode::UrlAnalysis { url } => {
                let url = url.trim();
                let request =
                    AgentRequest::new(query, url_analysis_instruction(url, query)).with_url(url);
                let answer = self.delegate(&request).await;
                ChatMessage::assistant(answer, MessageKind::UrlDerived)
            }
        };

        session.log.push(reply.clone());
        Ok(reply)
    }

    /// Empty the session's conversation log
    pub fn clear_history(&self, session: &mut Session) {
        debug!(session_id = %session.id, messages = session.log.len(), "Clearing history");
        session.log.clear();
    }

    async fn delegate(&self, request: &AgentRequest) -> String {
        let Some(agent) = &self.agent else {
            return AGENT_NOT_CONFIGURED_REPLY.to_string();
        };

        match agent.search(request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(agent = agent.name(), error = %e, "Search agent failed");
                format!("Search probe encountered an anomaly: {e}")
            }
        }
    }
}
