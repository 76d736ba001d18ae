//! Greedy modularity maximization (Clauset–Newman–Moore).
//!
//! Agglomerative: start from singletons and repeatedly merge the pair of
//! *adjacent* communities whose merge raises modularity the most, stopping
//! when no merge helps.
//!
//! With `e_ij` the fraction of edge weight between communities i and j (each
//! direction) and `a_i` the fraction of edge ends in i:
//!
//! ```text
//! ΔQ(i, j) = 2 · (e_ij − γ · a_i · a_j)
//! ```
//!
//! Only pairs that share an edge can have ΔQ > 0, so the candidate set is the
//! community adjacency. Each merge scans all adjacent pairs, which is
//! quadratic-ish in the worst case: this is the algorithm to run on a
//! quotient graph, not on the raw network.
//!
//! ## References
//!
//! Clauset, Newman, Moore (2004). "Finding community structure in very large
//! networks." Physical Review E 70, 066111.

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{weighted_degrees, weighted_edges, EdgeWeight};
use crate::partition::Partition;
use petgraph::graph::UnGraph;
use std::collections::BTreeMap;

/// Greedy (CNM) modularity maximization.
#[derive(Debug, Clone)]
pub struct GreedyModularity {
    /// Resolution parameter (gamma).
    resolution: f64,
}

impl GreedyModularity {
    /// Create a detector at resolution 1.
    pub fn new() -> Self {
        Self { resolution: 1.0 }
    }

    /// Set resolution parameter.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Default for GreedyModularity {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for GreedyModularity {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        let n = graph.node_count();
        if n == 0 {
            return Err(Error::EmptyInput);
        }

        let edges = weighted_edges(graph);
        let m: f64 = edges.iter().map(|(_, _, w)| w).sum();
        if m <= 0.0 {
            return Ok(Partition::singletons(n));
        }
        let two_m = 2.0 * m;

        let mut a: Vec<f64> = weighted_degrees(graph).into_iter().map(|k| k / two_m).collect();
        // links[i][j] = e_ij for adjacent live communities; BTreeMap keeps the
        // scan order (and so tie-breaking) deterministic.
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for &(i, j, w) in &edges {
            if i != j {
                *links[i].entry(j).or_insert(0.0) += w / two_m;
                *links[j].entry(i).or_insert(0.0) += w / two_m;
            }
        }
        let mut absorbed_by: Vec<usize> = (0..n).collect();

        loop {
            let mut best: Option<(usize, usize, f64)> = None;
            for (i, neighbors) in links.iter().enumerate() {
                for (&j, &e_ij) in neighbors.range(i + 1..) {
                    let dq = 2.0 * (e_ij - self.resolution * a[i] * a[j]);
                    if best.map_or(true, |(_, _, b)| dq > b) {
                        best = Some((i, j, dq));
                    }
                }
            }

            let (keep, gone) = match best {
                Some((i, j, dq)) if dq > 0.0 => (i, j),
                _ => break,
            };

            let moved = std::mem::take(&mut links[gone]);
            for (k, e) in moved {
                let _ = links[k].remove(&gone);
                if k == keep {
                    continue;
                }
                *links[keep].entry(k).or_insert(0.0) += e;
                *links[k].entry(keep).or_insert(0.0) += e;
            }
            a[keep] += a[gone];
            a[gone] = 0.0;
            absorbed_by[gone] = keep;
        }

        let labels = (0..n).map(|node| root(&absorbed_by, node)).collect();
        Ok(Partition::new(labels).renumbered())
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}

/// Follow merge links to the surviving community.
fn root(absorbed_by: &[usize], mut node: usize) -> usize {
    while absorbed_by[node] != node {
        node = absorbed_by[node];
    }
    node
}
