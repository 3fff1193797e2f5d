//! Firecrawl API client
//!
//! Two endpoints are used: `/v1/search` for web search with scraped
//! markdown and `/v1/scrape` for a single page.
//!
//! Author: hephaex@gmail.com

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cosmo_core::AgentError;

/// Firecrawl REST client
pub struct FirecrawlClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
    scrape_options: ScrapeOptions,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions {
    formats: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    only_main_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<SearchHit>,
    error: Option<String>,
}

/// One web search result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub markdown: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapedPage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapedPage {
    markdown: Option<String>,
}

impl FirecrawlClient {
    pub fn new(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Search the web; each hit carries scraped markdown when available
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, AgentError> {
        let request = SearchRequest {
            query,
            limit,
            scrape_options: ScrapeOptions {
                formats: vec!["markdown"],
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::new(format!("Firecrawl search failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::new(format!(
                "Firecrawl search error ({status}): {error_text}"
            )));
        }

        let result: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::new(format!("Failed to parse Firecrawl response: {e}")))?;

        if !result.success {
            return Err(AgentError::new(
                result
                    .error
                    .unwrap_or_else(|| "Firecrawl search was not successful".to_string()),
            ));
        }

        debug!(hits = result.data.len(), "Firecrawl search finished");
        Ok(result.data)
    }

    /// Scrape one page as markdown
    pub async fn scrape(&self, url: &str) -> Result<String, AgentError> {
        let request = ScrapeRequest {
            url,
            formats: vec!["markdown"],
            only_main_content: true,
        };

        let response = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::new(format!("Firecrawl scrape failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::new(format!(
                "Firecrawl scrape error ({status}): {error_text}"
            )));
        }

        let result: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| AgentError::new(format!("Failed to parse Firecrawl response: {e}")))?;

        if !result.success {
            return Err(AgentError::new(
                result
                    .error
                    .unwrap_or_else(|| "Firecrawl scrape was not successful".to_string()),
            ));
        }

        result
            .data
            .and_then(|page| page.markdown)
            .ok_or_else(|| AgentError::new(format!("No content scraped from {url}")))
    }
}

/// Join search hits into one markdown document
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            let title = hit.title.as_deref().unwrap_or(&hit.url);
            let body = hit
                .markdown
                .as_deref()
                .or(hit.description.as_deref())
                .unwrap_or_default();
            format!("## {title}\n{}\n\n{}", hit.url, body.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
