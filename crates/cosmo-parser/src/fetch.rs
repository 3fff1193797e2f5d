//! Web page fetching
//!
//! A single GET per request with a fixed User-Agent and timeout.
//! Only HTTP 200 counts as success; there are no retries.
//!
//! Author: hephaex@gmail.com

use std::time::Duration;

use cosmo_core::FetchConfig;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Errors raised while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Target {url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<FetchError> for cosmo_core::CosmoError {
    fn from(err: FetchError) -> Self {
        cosmo_core::CosmoError::FetchError(err.to_string())
    }
}

/// HTTP page fetcher
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl PageFetcher {
    /// Create a fetcher from config
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Fetch the body of `url` as text
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = validate_url(url)?;
        debug!(url = %parsed, "Fetching page");

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %parsed, status = status.as_u16(), "Page fetch rejected");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        info!(url = %parsed, bytes = body.len(), "Page fetched");
        Ok(body)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Accept absolute http(s) URLs only
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, http::StatusCode as AxumStatus, routing::get, Router};

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/page",
                get(|| async { "<html><body><p>INSAT monitors the Arabian Sea.</p></body></html>" }),
            )
            .route(
                "/agent",
                get(|headers: HeaderMap| async move {
                    headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .route("/missing", get(|| async { (AxumStatus::NOT_FOUND, "gone") }))
            .route("/created", get(|| async { (AxumStatus::CREATED, "made") }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn fetcher() -> PageFetcher {
        PageFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let base = spawn_upstream().await;
        let body = fetcher().fetch(&format!("{base}/page")).await.unwrap();
        assert!(body.contains("Arabian Sea"));
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let base = spawn_upstream().await;
        let body = fetcher().fetch(&format!("{base}/agent")).await.unwrap();
        assert_eq!(body, "Mozilla/5.0 (Space-Explorer/1.0)");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let base = spawn_upstream().await;
        let err = fetcher().fetch(&format!("{base}/missing")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_only_200_is_success() {
        let base = spawn_upstream().await;
        let err = fetcher().fetch(&format!("{base}/created")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 201, .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to obtain a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher().fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://www.mosdac.gov.in").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(validate_url("not a url").is_err());
    }
}
