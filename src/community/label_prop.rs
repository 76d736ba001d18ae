//! Label propagation for community detection.
//!
//! Very fast O(E) algorithm where nodes adopt the label carrying the most
//! edge weight among their neighbors.
//!
//! Two update schedules are offered:
//!
//! - [`UpdateMode::Asynchronous`]: nodes are visited in random order and see
//!   labels already updated this round. Ties are broken randomly, so results
//!   vary between unseeded runs.
//! - [`UpdateMode::Synchronous`]: every node updates from the previous
//!   round's labels at once. Ties keep the current label if it is among the
//!   best, otherwise the smallest label wins, so the result is deterministic.
//!   Synchronous updates can oscillate on bipartite structure; the round cap
//!   bounds that.

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::EdgeWeight;
use crate::partition::Partition;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::prelude::*;
use std::collections::HashMap;

const TIE_EPS: f64 = 1e-12;

/// Update schedule for [`LabelPropagation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// All nodes update from the previous round's labels.
    Synchronous,
    /// Nodes update one at a time in random order.
    #[default]
    Asynchronous,
}

/// Label propagation community detection.
#[derive(Debug, Clone)]
pub struct LabelPropagation {
    /// Maximum iterations.
    max_iter: usize,
    /// Random seed.
    seed: Option<u64>,
    /// Update schedule.
    mode: UpdateMode,
}

impl LabelPropagation {
    /// Create a new (asynchronous) label propagation detector.
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            seed: None,
            mode: UpdateMode::Asynchronous,
        }
    }

    /// Synchronous, deterministic variant.
    pub fn synchronous() -> Self {
        Self::new().with_mode(UpdateMode::Synchronous)
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set update schedule.
    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Update schedule in use.
    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    /// Weight carried by each label around `node`.
    fn label_weights<N, E: EdgeWeight>(
        graph: &UnGraph<N, E>,
        labels: &[usize],
        node: usize,
    ) -> HashMap<usize, f64> {
        let mut weights = HashMap::new();
        for edge in graph.edges(NodeIndex::new(node)) {
            let other = if edge.source().index() == node {
                edge.target().index()
            } else {
                edge.source().index()
            };
            if other == node {
                continue;
            }
            *weights.entry(labels[other]).or_insert(0.0) += edge.weight().edge_weight();
        }
        weights
    }

    /// Labels tied for the maximum weight, in ascending order.
    fn best_labels(weights: &HashMap<usize, f64>) -> Vec<usize> {
        let max = weights.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut best: Vec<usize> = weights
            .iter()
            .filter(|(_, &w)| (w - max).abs() <= TIE_EPS)
            .map(|(&label, _)| label)
            .collect();
        best.sort_unstable();
        best
    }

    fn run_asynchronous<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Vec<usize> {
        let n = graph.node_count();
        let mut labels: Vec<usize> = (0..n).collect();
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let mut order: Vec<usize> = (0..n).collect();

        for _iter in 0..self.max_iter {
            let mut changed = false;
            order.shuffle(&mut rng);

            for &node in &order {
                let weights = Self::label_weights(graph, &labels, node);
                let candidates = Self::best_labels(&weights);
                if candidates.is_empty() || candidates.contains(&labels[node]) {
                    continue;
                }
                let new_label = if candidates.len() == 1 {
                    candidates[0]
                } else {
                    candidates[rng.random_range(0..candidates.len())]
                };
                labels[node] = new_label;
                changed = true;
            }

            if !changed {
                break;
            }
        }
        labels
    }

    fn run_synchronous<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Vec<usize> {
        let n = graph.node_count();
        let mut labels: Vec<usize> = (0..n).collect();

        for iter in 0..self.max_iter {
            let next: Vec<usize> = (0..n)
                .map(|node| {
                    let candidates = Self::best_labels(&Self::label_weights(graph, &labels, node));
                    match candidates.first() {
                        Some(_) if candidates.contains(&labels[node]) => labels[node],
                        Some(&smallest) => smallest,
                        None => labels[node],
                    }
                })
                .collect();

            if next == labels {
                log::debug!("synchronous label propagation converged after {iter} rounds");
                break;
            }
            labels = next;
        }
        labels
    }
}

impl Default for LabelPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for LabelPropagation {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }

        let labels = match self.mode {
            UpdateMode::Asynchronous => self.run_asynchronous(graph),
            UpdateMode::Synchronous => self.run_synchronous(graph),
        };
        Ok(Partition::new(labels).renumbered())
    }
}
