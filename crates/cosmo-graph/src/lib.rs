//! Cosmo Graph - Knowledge graph construction and rendering
//!
//! Folds entity pairs and relation triples into a directed multigraph
//! (parallel edges allowed), lays it out with a seeded force-directed
//! algorithm and renders it to SVG.
//!
//! Author: hephaex@gmail.com

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use cosmo_core::{EntityPair, Triple};

pub mod layout;
pub mod palette;
pub mod render;

pub use layout::ForceLayout;
pub use palette::{ColorRules, NodeCategory};
pub use render::{GraphRenderer, RenderError};

/// Edge as (source label, target label, relation label)
pub type EdgeView<'a> = (&'a str, &'a str, &'a str);

/// Directed multigraph keyed by entity string
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, String>,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh graph: pairs become "related" edges, triples become
    /// edges labeled with their predicate
    pub fn build<'a>(
        pairs: impl IntoIterator<Item = &'a EntityPair>,
        triples: impl IntoIterator<Item = &'a Triple>,
    ) -> Self {
        let mut graph = Self::new();

        for pair in pairs {
            graph.add_relation(&pair.source, &pair.target, pair.label());
        }
        for triple in triples {
            graph.add_relation(&triple.subject, &triple.object, &triple.predicate);
        }

        graph
    }

    /// Add an edge, creating missing nodes
    pub fn add_relation(&mut self, source: &str, target: &str, label: &str) {
        let from = self.node(source);
        let to = self.node(target);
        self.graph.add_edge(from, to, label.to_string());
    }

    fn node(&mut self, label: &str) -> NodeIndex {
        if let Some(index) = self.index.get(label) {
            return *index;
        }
        let index = self.graph.add_node(label.to_string());
        self.index.insert(label.to_string(), index);
        index
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Node labels in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
                edge.weight().as_str(),
            )
        })
    }

    /// Node-index pairs of all edges, for layout
    pub(crate) fn edge_endpoints(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    /// Underlying petgraph graph
    pub fn graph(&self) -> &DiGraph<String, String> {
        &self.graph
    }
}
