//! Cosmo Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development. Credentials are optional:
//! a missing search agent key disables the agent instead of failing.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Web page fetching
    pub fetch: FetchConfig,

    /// External search agent
    pub agent: AgentConfig,

    /// Graph layout and rendering
    pub render: RenderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, test fixtures)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(ttl) = lookup("SESSION_TTL_SECS") {
            self.server.session_ttl_secs = parse_value("SESSION_TTL_SECS", ttl)?;
        }
        if let Some(max) = lookup("MAX_SESSIONS") {
            self.server.max_sessions = parse_value("MAX_SESSIONS", max)?;
        }

        // Fetch
        if let Some(agent) = lookup("FETCH_USER_AGENT") {
            self.fetch.user_agent = agent;
        }
        if let Some(timeout) = lookup("FETCH_TIMEOUT_SECS") {
            self.fetch.timeout_secs = parse_value("FETCH_TIMEOUT_SECS", timeout)?;
        }

        // Search agent; blank keys count as absent
        if let Some(key) = lookup("FIRECRAWL_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.agent.firecrawl_api_key = Some(key);
        }
        if let Some(url) = lookup("FIRECRAWL_URL") {
            self.agent.firecrawl_url = url;
        }
        if let Some(key) = lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.agent.llm_api_key = Some(key);
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.agent.llm_base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.agent.model = model;
        }
        if let Some(timeout) = lookup("AGENT_TIMEOUT_SECS") {
            self.agent.timeout_secs = parse_value("AGENT_TIMEOUT_SECS", timeout)?;
        }

        // Rendering
        if let Some(seed) = lookup("LAYOUT_SEED") {
            self.render.seed = parse_value("LAYOUT_SEED", seed)?;
        }
        if let Some(max) = lookup("RENDER_MAX_NODES") {
            self.render.max_nodes = parse_value("RENDER_MAX_NODES", max)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", json)?;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,

    /// Sessions idle for longer than this are evicted
    pub session_ttl_secs: u64,

    /// Upper bound on live sessions
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 120,
            max_body_size: 10 * 1024 * 1024, // 10MB
            cors_enabled: true,
            cors_origins: vec![],
            session_ttl_secs: 3600,
            max_sessions: 10_000,
        }
    }
}

/// Outbound page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Space-Explorer/1.0)".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Search agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Firecrawl API key; the agent is disabled without it
    pub firecrawl_api_key: Option<String>,

    /// Firecrawl API base URL
    pub firecrawl_url: String,

    /// Key for the OpenAI-compatible analysis model (Groq by default)
    pub llm_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    pub llm_base_url: String,

    /// Analysis model name
    pub model: String,

    /// Maximum tokens for the analysis
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Upper bound for one agent call, in seconds
    pub timeout_secs: u64,

    /// Maximum characters of gathered content passed on or returned
    pub max_content_chars: usize,

    /// Number of web results gathered for a search
    pub search_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            firecrawl_api_key: None,
            firecrawl_url: "https://api.firecrawl.dev".to_string(),
            llm_api_key: None,
            llm_base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            max_tokens: 1024,
            temperature: 0.2,
            timeout_secs: 60,
            max_content_chars: 8000,
            search_limit: 3,
        }
    }
}

impl AgentConfig {
    /// Whether the agent can be constructed
    pub fn is_configured(&self) -> bool {
        self.firecrawl_api_key.is_some()
    }
}

/// Graph layout and rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Layout random seed
    pub seed: u64,

    /// Optimal distance between nodes (layout units)
    pub spring_k: f64,

    /// Layout iterations
    pub iterations: usize,

    /// Largest graph (in nodes) that is laid out and rendered
    pub max_nodes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1000,
            seed: 42,
            spring_k: 2.0,
            iterations: 100,
            max_nodes: 500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Server log level (trace, debug, info, warn, error) when `RUST_LOG` is unset
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
