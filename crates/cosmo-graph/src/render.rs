//! SVG rendering of a knowledge graph
//!
//! Dashboard styling: light background, coloured nodes with a white rim and
//! a soft halo, grey directed edges, boxed edge labels and a legend in the
//! upper right corner.

use std::collections::HashMap;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::info;

use crate::layout::{ForceLayout, Point};
use crate::palette::{display_label, shows_edge_label, ColorRules, NodeCategory};
use crate::KnowledgeGraph;
use cosmo_core::{CosmoError, RenderConfig};

pub const TITLE: &str = "Knowledge Graph - Entity Relationships";

const BACKGROUND: RGBColor = RGBColor(0xF8, 0xF9, 0xFA);
const TITLE_COLOR: RGBColor = RGBColor(0x2C, 0x3E, 0x50);
const EDGE_COLOR: RGBColor = RGBColor(0xBD, 0xC3, 0xC7);
const EDGE_LABEL_COLOR: RGBColor = RGBColor(0x34, 0x49, 0x5E);

const MARGIN: i32 = 90;
const NODE_RADIUS: i32 = 30;
const HALO_RADIUS: i32 = 33;
const ARROW_LENGTH: f64 = 14.0;
const ARROW_SPREAD: f64 = 0.4;
const NODE_FONT: u32 = 13;
const EDGE_FONT: u32 = 11;
const TITLE_FONT: u32 = 22;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot render an empty graph")]
    EmptyGraph,

    #[error("Graph has {nodes} nodes, more than the {max} that can be rendered")]
    TooLarge { nodes: usize, max: usize },

    #[error("Drawing failed: {0}")]
    Drawing(String),
}

impl From<RenderError> for CosmoError {
    fn from(err: RenderError) -> Self {
        CosmoError::RenderError(err.to_string())
    }
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Renders graphs to standalone SVG documents
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    width: u32,
    height: u32,
    max_nodes: usize,
    layout: ForceLayout,
    rules: ColorRules,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl GraphRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            max_nodes: config.max_nodes,
            layout: ForceLayout::from_config(config),
            rules: ColorRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ColorRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_layout(mut self, layout: ForceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn render_svg(&self, graph: &KnowledgeGraph) -> Result<String, RenderError> {
        if graph.is_empty() {
            return Err(RenderError::EmptyGraph);
        }
        let nodes = graph.node_count();
        if nodes > self.max_nodes {
            return Err(RenderError::TooLarge {
                nodes,
                max: self.max_nodes,
            });
        }

        let positions = self.layout.positions(graph);
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&BACKGROUND).map_err(drawing)?;

            let title = ("sans-serif", TITLE_FONT)
                .into_font()
                .style(FontStyle::Bold)
                .color(&TITLE_COLOR);
            let area = root.titled(TITLE, title).map_err(drawing)?;

            let (w, h) = area.dim_in_pixel();
            let points: Vec<(i32, i32)> = positions
                .iter()
                .map(|p| to_pixel(*p, w as i32, h as i32))
                .collect();

            draw_edges(&area, graph, &points)?;
            self.draw_nodes(&area, graph, &points)?;
            draw_edge_labels(&area, graph, &points)?;
            draw_legend(&area, w as i32)?;

            root.present().map_err(drawing)?;
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            bytes = svg.len(),
            "Graph rendered"
        );

        Ok(svg)
    }

    fn draw_nodes(
        &self,
        area: &Area<'_>,
        graph: &KnowledgeGraph,
        points: &[(i32, i32)],
    ) -> Result<(), RenderError> {
        let label_style = ("sans-serif", NODE_FONT)
            .into_font()
            .style(FontStyle::Bold)
            .color(&TITLE_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Center));

        for (label, &center) in graph.nodes().zip(points) {
            let (r, g, b) = self.rules.classify(label).rgb();
            let color = RGBColor(r, g, b);

            area.draw(&Circle::new(center, HALO_RADIUS, color.mix(0.3).filled()))
                .map_err(drawing)?;
            area.draw(&Circle::new(center, NODE_RADIUS, color.mix(0.9).filled()))
                .map_err(drawing)?;
            area.draw(&Circle::new(center, NODE_RADIUS, WHITE.stroke_width(2)))
                .map_err(drawing)?;
            area.draw(&Text::new(display_label(label), center, label_style.clone()))
                .map_err(drawing)?;
        }

        Ok(())
    }
}

/// Map a [-1, 1] layout position into the drawing area, y pointing up
fn to_pixel((x, y): Point, width: i32, height: i32) -> (i32, i32) {
    let usable_w = f64::from((width - 2 * MARGIN).max(1));
    let usable_h = f64::from((height - 2 * MARGIN).max(1));
    let px = f64::from(MARGIN) + (x + 1.0) / 2.0 * usable_w;
    let py = f64::from(MARGIN) + (1.0 - y) / 2.0 * usable_h;
    (px.round() as i32, py.round() as i32)
}

fn draw_edges(
    area: &Area<'_>,
    graph: &KnowledgeGraph,
    points: &[(i32, i32)],
) -> Result<(), RenderError> {
    let style = EDGE_COLOR.mix(0.6).stroke_width(2);

    for (source, target) in graph.edge_endpoints() {
        let from = points[source];
        let to = points[target];

        if source == target {
            let loop_center = (from.0, from.1 - NODE_RADIUS);
            area.draw(&Circle::new(loop_center, NODE_RADIUS / 2, style))
                .map_err(drawing)?;
            continue;
        }

        let dx = f64::from(to.0 - from.0);
        let dy = f64::from(to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();
        if length <= f64::from(NODE_RADIUS) {
            continue;
        }

        // Stop at the rim of the target node
        let (ux, uy) = (dx / length, dy / length);
        let tip = (
            f64::from(to.0) - ux * f64::from(NODE_RADIUS),
            f64::from(to.1) - uy * f64::from(NODE_RADIUS),
        );
        let tip_px = (tip.0.round() as i32, tip.1.round() as i32);

        area.draw(&PathElement::new(vec![from, tip_px], style))
            .map_err(drawing)?;

        let back = uy.atan2(ux) + std::f64::consts::PI;
        for wing in [back - ARROW_SPREAD, back + ARROW_SPREAD] {
            let end = (
                (tip.0 + ARROW_LENGTH * wing.cos()).round() as i32,
                (tip.1 + ARROW_LENGTH * wing.sin()).round() as i32,
            );
            area.draw(&PathElement::new(vec![tip_px, end], style))
                .map_err(drawing)?;
        }
    }

    Ok(())
}

fn draw_edge_labels(
    area: &Area<'_>,
    graph: &KnowledgeGraph,
    points: &[(i32, i32)],
) -> Result<(), RenderError> {
    let text_style = ("sans-serif", EDGE_FONT)
        .into_font()
        .color(&EDGE_LABEL_COLOR)
        .pos(Pos::new(HPos::Center, VPos::Center));

    // Parallel edges stack their labels
    let mut stacked: HashMap<(usize, usize), i32> = HashMap::new();

    for ((source, target), (_, _, label)) in graph.edge_endpoints().zip(graph.edges()) {
        if !shows_edge_label(label) {
            continue;
        }

        let slot = stacked.entry((source, target)).or_insert(0);
        let offset = *slot * (EDGE_FONT as i32 + 6);
        *slot += 1;

        let (from, to) = (points[source], points[target]);
        let center = if source == target {
            (from.0, from.1 - 2 * NODE_RADIUS)
        } else {
            ((from.0 + to.0) / 2, (from.1 + to.1) / 2 + offset)
        };

        let half_w = (label.chars().count() as i32 * 6 + 8) / 2;
        let half_h = EDGE_FONT as i32 / 2 + 3;
        let corners = [
            (center.0 - half_w, center.1 - half_h),
            (center.0 + half_w, center.1 + half_h),
        ];
        area.draw(&Rectangle::new(corners, WHITE.mix(0.8).filled()))
            .map_err(drawing)?;
        area.draw(&Rectangle::new(corners, EDGE_COLOR.stroke_width(1)))
            .map_err(drawing)?;
        area.draw(&Text::new(label.to_string(), center, text_style.clone()))
            .map_err(drawing)?;
    }

    Ok(())
}

fn draw_legend(area: &Area<'_>, width: i32) -> Result<(), RenderError> {
    const ROW: i32 = 26;
    const BOX_W: i32 = 200;

    let box_h = ROW * NodeCategory::ALL.len() as i32 + 16;
    let left = width - BOX_W - 16;
    let top = 16;

    area.draw(&Rectangle::new(
        [(left + 4, top + 4), (left + BOX_W + 4, top + box_h + 4)],
        BLACK.mix(0.15).filled(),
    ))
    .map_err(drawing)?;
    area.draw(&Rectangle::new(
        [(left, top), (left + BOX_W, top + box_h)],
        WHITE.filled(),
    ))
    .map_err(drawing)?;
    area.draw(&Rectangle::new(
        [(left, top), (left + BOX_W, top + box_h)],
        EDGE_COLOR.stroke_width(1),
    ))
    .map_err(drawing)?;

    let text_style = ("sans-serif", NODE_FONT)
        .into_font()
        .color(&TITLE_COLOR)
        .pos(Pos::new(HPos::Left, VPos::Center));

    for (row, category) in NodeCategory::ALL.iter().enumerate() {
        let y = top + 8 + ROW / 2 + row as i32 * ROW;
        let (r, g, b) = category.rgb();

        area.draw(&Circle::new((left + 20, y), 7, RGBColor(r, g, b).filled()))
            .map_err(drawing)?;
        area.draw(&Text::new(
            category.legend_name(),
            (left + 36, y),
            text_style.clone(),
        ))
        .map_err(drawing)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmo_core::{EntityPair, Triple};

    fn sample_graph() -> KnowledgeGraph {
        KnowledgeGraph::build(
            &[
                EntityPair::new("ISRO", "India"),
                EntityPair::new("INSAT", "Space Applications Centre"),
            ],
            &[
                Triple::new("INSAT", "monitor", "Bay of Bengal"),
                Triple::new("MOSDAC", "be", "centre"),
            ],
        )
    }

    #[test]
    fn test_empty_graph_is_an_error() {
        let result = GraphRenderer::default().render_svg(&KnowledgeGraph::new());
        assert!(matches!(result, Err(RenderError::EmptyGraph)));
    }

    #[test]
    fn test_oversized_graph_is_rejected() {
        let config = RenderConfig {
            max_nodes: 3,
            ..RenderConfig::default()
        };
        let result = GraphRenderer::new(&config).render_svg(&sample_graph());

        match result {
            Err(RenderError::TooLarge { nodes, max }) => {
                assert!(nodes > 3);
                assert_eq!(max, 3);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_svg_document() {
        let svg = GraphRenderer::default().render_svg(&sample_graph()).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains(TITLE));
        assert!(svg.contains("1600"));
        assert!(svg.to_uppercase().contains("#F8F9FA"));
    }

    #[test]
    fn test_labels_and_legend() {
        let svg = GraphRenderer::default().render_svg(&sample_graph()).unwrap();

        assert!(svg.contains("ISRO"));
        assert!(svg.contains("Bay of Bengal"));
        // Long labels are shortened for display
        assert!(svg.contains("Space Applic..."));
        assert!(!svg.contains("Space Applications Centre"));

        assert!(svg.contains("monitor"));
        assert!(!svg.contains("related"));

        for category in NodeCategory::ALL {
            assert!(svg.contains(category.legend_name()));
            assert!(svg.to_uppercase().contains(category.hex()));
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = GraphRenderer::default();
        let first = renderer.render_svg(&sample_graph()).unwrap();
        let second = renderer.render_svg(&sample_graph()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_node_graph() {
        let graph = KnowledgeGraph::build(&[], &[Triple::new("ISRO", "be", "ISRO")]);
        let svg = GraphRenderer::default().render_svg(&graph).unwrap();
        assert!(svg.contains("ISRO"));
    }

    #[test]
    fn test_render_error_converts() {
        let err: CosmoError = RenderError::EmptyGraph.into();
        assert!(matches!(err, CosmoError::RenderError(_)));
    }
}
