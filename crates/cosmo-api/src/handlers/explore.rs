//! Exploration handlers: upload or URL in, metrics, relations and graph out
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::handlers::{require_session, run_blocking, PairDto, TripleDto};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use cosmo_chat::Exploration;
use cosmo_core::CosmoError;
use cosmo_parser::RawDocument;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Uploaded document
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// File name; the extension selects the format (.txt, .html, .htm)
    #[schema(example = "mosdac.html")]
    pub filename: String,

    /// File content
    pub content: String,
}

/// Page to fetch
#[derive(Debug, Deserialize, ToSchema)]
pub struct UrlRequest {
    #[schema(example = "https://www.mosdac.gov.in")]
    pub url: String,
}

/// Exploration result
#[derive(Debug, Serialize, ToSchema)]
pub struct ExplorationResponse {
    pub source: String,
    /// First 500 words of the cleaned text
    pub preview: String,
    pub word_count: usize,
    pub pair_count: usize,
    pub triple_count: usize,
    pub unique_entities: usize,
    pub pairs: Vec<PairDto>,
    pub triples: Vec<TripleDto>,
    /// First 10 triples
    pub top_relations: Vec<TripleDto>,
    /// SVG document; absent when nothing was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_svg: Option<String>,
}

impl From<Exploration> for ExplorationResponse {
    fn from(exploration: Exploration) -> Self {
        Self {
            source: exploration.source,
            preview: exploration.preview,
            word_count: exploration.word_count,
            pair_count: exploration.pair_count,
            triple_count: exploration.triple_count,
            unique_entities: exploration.unique_entities,
            pairs: exploration.pairs.into_iter().map(PairDto::from).collect(),
            triples: exploration.triples.into_iter().map(TripleDto::from).collect(),
            top_relations: exploration
                .top_relations
                .into_iter()
                .map(TripleDto::from)
                .collect(),
            graph_svg: exploration.graph,
        }
    }
}

/// Explore an uploaded text or HTML document
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/explore/upload",
    tag = "explore",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Exploration result", body = ExplorationResponse),
        (status = 400, description = "Unsupported file", body = crate::error::ApiError),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn explore_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ExplorationResponse>, AppError> {
    let session = require_session(&state, id).await?;
    let doc = RawDocument::from_upload(&request.filename, request.content.as_bytes())
        .map_err(CosmoError::from)?;

    let mut session = session.lock_owned().await;
    let exploration =
        run_blocking(move || state.explorer.explore_document(&mut session, &doc)).await?;

    Ok(Json(exploration.into()))
}

/// Fetch a web page and explore it
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/explore/url",
    tag = "explore",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UrlRequest,
    responses(
        (status = 200, description = "Exploration result", body = ExplorationResponse),
        (status = 404, description = "Session not found", body = crate::error::ApiError),
        (status = 502, description = "Page could not be fetched", body = crate::error::ApiError)
    )
)]
pub async fn explore_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<ExplorationResponse>, AppError> {
    let session = require_session(&state, id).await?;

    // Held across the fetch so explorations of one session stay ordered
    let mut session = session.lock_owned().await;
    let doc = state.explorer.fetch_document(&request.url).await.map_err(|e| {
        warn!(session_id = %id, url = %request.url, "Exploration aborted, session unchanged");
        e
    })?;
    let exploration =
        run_blocking(move || state.explorer.explore_document(&mut session, &doc)).await?;

    Ok(Json(exploration.into()))
}
