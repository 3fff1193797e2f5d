//! Knowledge exploration pipeline
//!
//! load or fetch -> normalize -> extract -> cache update -> graph -> SVG

use serde::Serialize;
use tracing::{info, warn};

use cosmo_core::{AppConfig, CosmoError, EntityPair, Result, Triple};
use cosmo_extractor::{Extraction, Extractor};
use cosmo_graph::{GraphRenderer, KnowledgeGraph};
use cosmo_parser::{clean_text, PageFetcher, RawDocument};

use crate::session::Session;

/// Words of cleaned text kept in the preview
pub const PREVIEW_WORDS: usize = 500;

/// Triples listed as top relations
pub const TOP_RELATIONS: usize = 10;

/// Summary of one exploration run
#[derive(Debug, Clone, Serialize)]
pub struct Exploration {
    /// File name or URL
    pub source: String,
    /// First words of the cleaned text
    pub preview: String,
    pub word_count: usize,
    pub pair_count: usize,
    pub triple_count: usize,
    /// Distinct subjects and objects of the triples
    pub unique_entities: usize,
    pub pairs: Vec<EntityPair>,
    pub triples: Vec<Triple>,
    pub top_relations: Vec<Triple>,
    /// SVG document, when anything was extracted
    pub graph: Option<String>,
}

/// Runs explorations against a session
pub struct Explorer {
    extractor: Extractor,
    fetcher: PageFetcher,
    renderer: GraphRenderer,
}

impl Explorer {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(),
            fetcher: PageFetcher::new(&config.fetch)?,
            renderer: GraphRenderer::new(&config.render),
        })
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Explore an uploaded or loaded document
    pub fn explore_document(&self, session: &mut Session, doc: &RawDocument) -> Result<Exploration> {
        self.explore_text(session, &doc.source, &doc.content)
    }

    /// Explore raw text or HTML
    pub fn explore_text(&self, session: &mut Session, source: &str, raw: &str) -> Result<Exploration> {
        let cleaned = clean_text(raw);
        let extraction = self.extractor.extract(&cleaned)?;

        session.cache.replace(extraction.triples.clone());

        let graph = self.render(&extraction);
        let exploration = summarize(source, &cleaned, extraction, graph);

        info!(
            session_id = %session.id,
            source = %exploration.source,
            pairs = exploration.pair_count,
            triples = exploration.triple_count,
            rendered = exploration.graph.is_some(),
            "Exploration finished"
        );

        Ok(exploration)
    }

    /// Fetch a page and explore it; on fetch failure the session is untouched
    pub async fn explore_url(&self, session: &mut Session, url: &str) -> Result<Exploration> {
        let doc = self.fetch_document(url).await?;
        self.explore_document(session, &doc)
    }

    /// Fetch a page as a document without exploring it
    pub async fn fetch_document(&self, url: &str) -> Result<RawDocument> {
        let body = self.fetcher.fetch(url).await.map_err(|e| {
            warn!(url, error = %e, "Probe failed to reach the page");
            CosmoError::from(e)
        })?;

        Ok(RawDocument::from_page(url, body))
    }

    fn render(&self, extraction: &Extraction) -> Option<String> {
        if extraction.is_empty() {
            return None;
        }

        let graph = KnowledgeGraph::build(&extraction.pairs, &extraction.triples);
        match self.renderer.render_svg(&graph) {
            Ok(svg) => Some(svg),
            Err(e) => {
                warn!(error = %e, "Graph rendering failed");
                None
            }
        }
    }
}

fn summarize(source: &str, cleaned: &str, extraction: Extraction, graph: Option<String>) -> Exploration {
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let preview = words
        .iter()
        .take(PREVIEW_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Exploration {
        source: source.to_string(),
        preview,
        word_count: words.len(),
        pair_count: extraction.pair_count(),
        triple_count: extraction.triple_count(),
        unique_entities: extraction.unique_entities().len(),
        top_relations: extraction.top_relations(TOP_RELATIONS),
        pairs: extraction.pairs.into_iter().collect(),
        triples: extraction.triples.into_iter().collect(),
        graph,
    }
}
