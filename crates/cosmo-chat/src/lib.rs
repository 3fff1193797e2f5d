//! Cosmo Chat - Exploration and conversation layer
//!
//! Everything a front end needs on top of the extraction pipeline:
//! - `Session`: conversation log and extraction cache of one user
//! - `Explorer`: text or URL in, metrics, relations and SVG graph out
//! - `match_query`: keyword lookup over cached triples
//! - `Assistant`: chat dispatch across knowledge base, web search and URL analysis
//!
//! Author: hephaex@gmail.com

pub mod assistant;
pub mod explorer;
pub mod matcher;
pub mod session;

pub use assistant::{Assistant, ChatMode, ChatRequest};
pub use explorer::{Exploration, Explorer};
pub use matcher::{match_query, QueryOutcome};
pub use session::{ConversationLog, ExtractionCache, Session};
