//! Stand-alone graph rendering
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::handlers::{run_blocking, PairDto, TripleDto};
use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use cosmo_core::{CosmoError, EntityPair, Triple};
use cosmo_graph::KnowledgeGraph;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

/// Relations to draw
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenderRequest {
    #[serde(default)]
    pub pairs: Vec<PairDto>,
    #[serde(default)]
    pub triples: Vec<TripleDto>,
}

/// Render pairs and triples as an SVG knowledge graph
#[utoipa::path(
    post,
    path = "/api/v1/graph/render",
    tag = "graph",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "SVG document", content_type = "image/svg+xml", body = String),
        (status = 422, description = "Empty graph, or more nodes than the render limit", body = crate::error::ApiError)
    )
)]
pub async fn render_graph(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let pairs: Vec<EntityPair> = request.pairs.into_iter().map(EntityPair::from).collect();
    let triples: Vec<Triple> = request.triples.into_iter().map(Triple::from).collect();

    let graph = KnowledgeGraph::build(&pairs, &triples);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Rendering graph"
    );

    let svg = run_blocking(move || {
        state
            .renderer
            .render_svg(&graph)
            .map_err(CosmoError::from)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}
