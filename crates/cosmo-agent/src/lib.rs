//! Cosmo Agent - Web search and page analysis
//!
//! `FirecrawlAgent` gathers markdown with Firecrawl (web search, or a single
//! page scrape when a URL is given) and, when an LLM key is configured, has
//! an OpenAI-compatible model answer the instruction from that content.
//! Without an LLM key the gathered content itself is the answer.
//!
//! Author: hephaex@gmail.com

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use cosmo_core::{AgentConfig, AgentError, AgentRequest, SearchAgent};

pub mod firecrawl;
pub mod llm;

pub use firecrawl::{FirecrawlClient, SearchHit};
pub use llm::ChatClient;

/// Firecrawl-backed search agent
pub struct FirecrawlAgent {
    firecrawl: FirecrawlClient,
    llm: Option<ChatClient>,
    timeout: Duration,
    search_limit: usize,
    max_content_chars: usize,
}

impl FirecrawlAgent {
    /// Build the agent; `None` when no Firecrawl key is configured
    pub fn from_config(config: &AgentConfig) -> Option<Self> {
        let api_key = config.firecrawl_api_key.clone()?;
        let client = Client::new();

        Some(Self {
            firecrawl: FirecrawlClient::new(client.clone(), api_key, config.firecrawl_url.clone()),
            llm: ChatClient::from_config(client, config),
            timeout: Duration::from_secs(config.timeout_secs),
            search_limit: config.search_limit,
            max_content_chars: config.max_content_chars,
        })
    }

    /// Whether answers are summarized by a model
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Scrape the request's URL, or search the web for its bare query
    async fn gather(&self, request: &AgentRequest) -> Result<String, AgentError> {
        let content = match request.url.as_deref() {
            Some(url) => self.firecrawl.scrape(url).await?,
            None => {
                let query = request.query.as_str();
                let hits = self.firecrawl.search(query, self.search_limit).await?;
                if hits.is_empty() {
                    return Err(AgentError::new(format!("No web results for: {query}")));
                }
                firecrawl::format_hits(&hits)
            }
        };

        Ok(truncate_chars(content.trim(), self.max_content_chars).to_string())
    }

    async fn run(&self, request: &AgentRequest) -> Result<String, AgentError> {
        let content = self.gather(request).await?;

        match &self.llm {
            Some(llm) => llm.analyze(&request.instruction, &content).await,
            None => Ok(content),
        }
    }
}

#[async_trait]
impl SearchAgent for FirecrawlAgent {
    async fn search(&self, request: &AgentRequest) -> Result<String, AgentError> {
        info!(
            agent = self.name(),
            query = %request.query,
            url = request.url.as_deref().unwrap_or("-"),
            "Running search agent"
        );

        match tokio::time::timeout(self.timeout, self.run(request)).await {
            Ok(Ok(answer)) => {
                info!(chars = answer.len(), "Search agent answered");
                Ok(answer)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Search agent failed");
                Err(err)
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Search agent timed out");
                Err(AgentError::new(format!(
                    "Search agent timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "CosmicFirecrawlAgent"
    }
}

/// Longest prefix of at most `max` characters
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_upstream(delay_ms: u64) -> String {
        let app = Router::new()
            .route(
                "/v1/search",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "success": true,
                        "data": [{
                            "url": "https://www.isro.gov.in",
                            "title": "ISRO",
                            "markdown": format!("Results for {}", body["query"].as_str().unwrap_or_default()),
                        }]
                    }))
                }),
            )
            .route(
                "/v1/scrape",
                post(move |Json(body): Json<Value>| async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    if body["url"] == "https://broken.example" {
                        return Json(json!({ "success": false, "error": "blocked" }));
                    }
                    Json(json!({
                        "success": true,
                        "data": { "markdown": "MOSDAC hosts INSAT-3D products." }
                    }))
                }),
            )
            .route(
                "/llm/chat/completions",
                post(|Json(body): Json<Value>| async move {
                    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
                    Json(json!({
                        "choices": [{
                            "message": {
                                "role": "assistant",
                                "content": format!(
                                    "Summary of {} chars for: {}",
                                    prompt.len(),
                                    prompt.lines().next().unwrap_or_default()
                                )
                            }
                        }]
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn config(base: &str) -> AgentConfig {
        AgentConfig {
            firecrawl_api_key: Some("fc-test".to_string()),
            firecrawl_url: base.to_string(),
            llm_base_url: format!("{base}/llm"),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_requires_firecrawl_key() {
        assert!(FirecrawlAgent::from_config(&AgentConfig::default()).is_none());
    }

    #[tokio::test]
    async fn test_search_without_llm_returns_content() {
        let base = spawn_upstream(0).await;
        let agent = FirecrawlAgent::from_config(&config(&base)).unwrap();
        assert!(!agent.has_llm());

        let request = AgentRequest::new(
            "ISRO missions",
            "Search the web and analyze information about: ISRO missions",
        );
        let answer = agent.search(&request).await.unwrap();
        assert!(answer.starts_with("## ISRO"));
        assert!(answer.contains("Results for ISRO missions"));
    }

    #[tokio::test]
    async fn test_web_search_sends_bare_query() {
        let base = spawn_upstream(0).await;
        let agent = FirecrawlAgent::from_config(&config(&base)).unwrap();

        let request = AgentRequest::new(
            "INSAT-3DR",
            "Search the web and analyze information about: INSAT-3DR",
        );
        let answer = agent.search(&request).await.unwrap();

        assert!(answer.contains("Results for INSAT-3DR"));
        assert!(!answer.contains("Search the web"));
    }

    #[tokio::test]
    async fn test_llm_receives_instruction() {
        let base = spawn_upstream(0).await;
        let agent = FirecrawlAgent::from_config(&AgentConfig {
            llm_api_key: Some("gsk-test".to_string()),
            ..config(&base)
        })
        .unwrap();

        let request = AgentRequest::new("ISRO", "Summarize what the results say about ISRO");
        let answer = agent.search(&request).await.unwrap();

        assert!(answer.contains("Summarize what the results say about ISRO"));
    }

    #[tokio::test]
    async fn test_scrape_with_llm() {
        let base = spawn_upstream(0).await;
        let agent = FirecrawlAgent::from_config(&AgentConfig {
            llm_api_key: Some("gsk-test".to_string()),
            ..config(&base)
        })
        .unwrap();

        let request = AgentRequest::new("What is hosted?", "What is hosted?")
            .with_url("https://www.mosdac.gov.in");
        let answer = agent.search(&request).await.unwrap();
        assert!(answer.starts_with("Summary of"));
    }

    #[tokio::test]
    async fn test_unsuccessful_scrape_is_an_error() {
        let base = spawn_upstream(0).await;
        let agent = FirecrawlAgent::from_config(&config(&base)).unwrap();

        let request =
            AgentRequest::new("anything", "anything").with_url("https://broken.example");
        let err = agent.search(&request).await.unwrap_err();
        assert_eq!(err.message, "blocked");
    }

    #[tokio::test]
    async fn test_timeout() {
        let base = spawn_upstream(2_000).await;
        let agent = FirecrawlAgent::from_config(&AgentConfig {
            timeout_secs: 1,
            ..config(&base)
        })
        .unwrap();

        let request = AgentRequest::new("slow", "slow").with_url("https://www.mosdac.gov.in");
        let err = agent.search(&request).await.unwrap_err();
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let agent = FirecrawlAgent::from_config(&config(&format!("http://{addr}"))).unwrap();
        let err = agent
            .search(&AgentRequest::new("ISRO", "ISRO"))
            .await
            .unwrap_err();
        assert!(err.message.contains("Firecrawl search failed"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("INSAT-3D", 5), "INSAT");
        assert_eq!(truncate_chars("Bay", 10), "Bay");
        assert_eq!(truncate_chars("αβγ", 2), "αβ");
    }
}
