//! Force-directed layout
//!
//! Fruchterman–Reingold with a seeded start, a linear cooling schedule and a
//! final rescale into the [-1, 1] square.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::KnowledgeGraph;
use cosmo_core::RenderConfig;

/// 2D position in layout units
pub type Point = (f64, f64);

const MIN_DISTANCE: f64 = 0.01;
const CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Seeded Fruchterman–Reingold layout
#[derive(Debug, Clone, PartialEq)]
pub struct ForceLayout {
    seed: u64,
    k: f64,
    iterations: usize,
}

impl Default for ForceLayout {
    fn default() -> Self {
        Self {
            seed: 42,
            k: 2.0,
            iterations: 100,
        }
    }
}

impl ForceLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            seed: config.seed,
            k: config.spring_k,
            iterations: config.iterations,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Position of every node, indexed like `KnowledgeGraph::nodes`
    pub fn positions(&self, graph: &KnowledgeGraph) -> Vec<Point> {
        let n = graph.node_count();
        match n {
            0 => return Vec::new(),
            1 => return vec![(0.0, 0.0)],
            _ => {}
        }

        // Attraction runs along edges only: direction ignored, parallel
        // edges pull once each, self-loops not at all
        let springs: Vec<(usize, usize)> = graph
            .edge_endpoints()
            .filter(|(source, target)| source != target)
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<Point> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();

        let mut temperature = 0.1 * span(&pos);
        let cooling = temperature / (self.iterations as f64 + 1.0);
        let k2 = self.k * self.k;

        for iteration in 0..self.iterations {
            let mut displacement = vec![(0.0_f64, 0.0_f64); n];

            // Repulsion between every pair
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let force = k2 / (distance * distance);
                    displacement[i].0 += dx * force;
                    displacement[i].1 += dy * force;
                    displacement[j].0 -= dx * force;
                    displacement[j].1 -= dy * force;
                }
            }

            for &(source, target) in &springs {
                let dx = pos[source].0 - pos[target].0;
                let dy = pos[source].1 - pos[target].1;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = distance / self.k;
                displacement[source].0 -= dx * force;
                displacement[source].1 -= dy * force;
                displacement[target].0 += dx * force;
                displacement[target].1 += dy * force;
            }

            let mut moved = 0.0;
            for (p, (dx, dy)) in pos.iter_mut().zip(displacement) {
                let mut length = (dx * dx + dy * dy).sqrt();
                if length < MIN_DISTANCE {
                    length = 0.1;
                }
                let step = (dx * temperature / length, dy * temperature / length);
                p.0 += step.0;
                p.1 += step.1;
                moved += step.0 * step.0 + step.1 * step.1;
            }

            temperature -= cooling;
            if moved.sqrt() / (n as f64) < CONVERGENCE_THRESHOLD {
                debug!(iteration, "Layout converged");
                break;
            }
        }

        rescale(&mut pos);
        pos
    }
}

/// Larger of the x and y extents
fn span(pos: &[Point]) -> f64 {
    let extent = |f: fn(&Point) -> f64| {
        let (lo, hi) = pos
            .iter()
            .map(f)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        hi - lo
    };
    extent(|p| p.0).max(extent(|p| p.1))
}

/// Center on the mean and scale the largest coordinate to 1
fn rescale(pos: &mut [Point]) {
    let n = pos.len() as f64;
    let (mx, my) = pos
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.0, sy + p.1));
    let (mx, my) = (mx / n, my / n);

    let mut limit = 0.0_f64;
    for p in pos.iter_mut() {
        p.0 -= mx;
        p.1 -= my;
        limit = limit.max(p.0.abs()).max(p.1.abs());
    }

    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= limit;
            p.1 /= limit;
        }
    }
}
