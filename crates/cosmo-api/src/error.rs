//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cosmo_core::CosmoError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message shown when a page cannot be fetched
pub const FETCH_FAILED_MESSAGE: &str = "Probe failed to establish connection with target coordinates";

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Well-formed request that cannot be processed (empty graph)
    Unprocessable(String),
    /// Target page could not be fetched
    FetchFailed(String),
    /// Search agent failure
    Upstream(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("UNPROCESSABLE", msg),
            ),
            AppError::FetchFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("FETCH_FAILED", FETCH_FAILED_MESSAGE).with_details(msg),
            ),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("AGENT_FAILED", "Search agent failed").with_details(msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error().with_details(msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<CosmoError> for AppError {
    fn from(err: CosmoError) -> Self {
        match err {
            CosmoError::NotFound(msg) => AppError::NotFound(msg),
            CosmoError::ValidationError(msg) => AppError::BadRequest(msg),
            CosmoError::InputError(msg) => AppError::BadRequest(msg),
            CosmoError::FetchError(msg) => AppError::FetchFailed(msg),
            CosmoError::ExtractionError(msg) => {
                AppError::Internal(format!("Extraction error: {msg}"))
            }
            CosmoError::RenderError(msg) => AppError::Unprocessable(msg),
            CosmoError::AgentError(msg) => AppError::Upstream(msg),
            CosmoError::ConfigError(msg) => {
                AppError::Internal(format!("Configuration error: {msg}"))
            }
            CosmoError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
