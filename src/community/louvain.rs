//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! 1. **Local moving**: start with each node in its own community and move
//!    nodes to the neighboring community with the highest modularity gain
//!    until no move helps.
//! 2. **Aggregation**: build a meta-graph where communities become single
//!    nodes. Edge weights are sums of edges between communities; internal
//!    edges become self-loops.
//! 3. **Iterate** on the meta-graph until modularity stops improving.
//!
//! Edge weights are honored throughout, which is what makes Louvain usable as
//! the meta algorithm over a weighted quotient graph.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{weighted_edges, EdgeWeight};
use crate::partition::Partition;
use petgraph::graph::UnGraph;
use std::collections::HashMap;

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma).
    resolution: f64,
    /// Maximum iterations per level.
    max_iter: usize,
    /// Maximum levels of aggregation.
    max_levels: usize,
    /// Minimum modularity improvement to continue.
    min_modularity_gain: f64,
}

/// Weighted working graph for one aggregation level.
struct Level {
    n: usize,
    edges: Vec<(usize, usize, f64)>,
    self_loops: Vec<f64>,
}

impl Level {
    fn total_weight(&self) -> f64 {
        self.edges.iter().map(|(_, _, w)| w).sum::<f64>() + self.self_loops.iter().sum::<f64>()
    }

    fn degrees(&self) -> Vec<f64> {
        let mut degrees = vec![0.0; self.n];
        for &(i, j, w) in &self.edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        for (d, &sl) in degrees.iter_mut().zip(&self.self_loops) {
            *d += 2.0 * sl;
        }
        degrees
    }
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set maximum iterations per level.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set maximum aggregation levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    fn modularity(&self, level: &Level, communities: &[usize]) -> f64 {
        let m = level.total_weight();
        if m == 0.0 {
            return 0.0;
        }
        let degrees = level.degrees();

        let mut q = 0.0;
        for &(i, j, w) in &level.edges {
            if communities[i] == communities[j] {
                q += w - self.resolution * degrees[i] * degrees[j] / (2.0 * m);
            }
        }
        for (i, &sl) in level.self_loops.iter().enumerate() {
            if sl > 0.0 {
                q += sl - self.resolution * degrees[i] * degrees[i] / (4.0 * m);
            }
        }
        q / m
    }

    /// Phase 1: local moving. Returns (communities, improved).
    fn local_moving(&self, level: &Level) -> (Vec<usize>, bool) {
        let n = level.n;
        let mut adj: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
        for &(i, j, w) in &level.edges {
            *adj[i].entry(j).or_insert(0.0) += w;
            *adj[j].entry(i).or_insert(0.0) += w;
        }

        let m = level.total_weight();
        if m == 0.0 {
            return ((0..n).collect(), false);
        }
        let degrees = level.degrees();

        let mut communities: Vec<usize> = (0..n).collect();
        let mut community_degrees = degrees.clone();
        let mut any_improved = false;

        for _iter in 0..self.max_iter {
            let mut improved = false;

            for node in 0..n {
                let current = communities[node];
                let ki = degrees[node];
                community_degrees[current] -= ki;

                let mut community_weights: HashMap<usize, f64> = HashMap::new();
                for (&neighbor, &w) in &adj[node] {
                    *community_weights.entry(communities[neighbor]).or_insert(0.0) += w;
                }

                // Staying alone has gain 0; the current community competes like
                // any other neighbor so a node does not leave it for a tie.
                let gain_of = |comm: usize, ki_in: f64| {
                    ki_in / m - self.resolution * community_degrees[comm] * ki / (2.0 * m * m)
                };
                let mut best = current;
                let mut best_gain = community_weights
                    .get(&current)
                    .map_or(0.0, |&ki_in| gain_of(current, ki_in))
                    .max(0.0);
                let mut candidates: Vec<(&usize, &f64)> = community_weights.iter().collect();
                candidates.sort_unstable_by_key(|(c, _)| **c);
                for (&target, &ki_in) in candidates {
                    let gain = gain_of(target, ki_in);
                    if gain > best_gain {
                        best_gain = gain;
                        best = target;
                    }
                }

                communities[node] = best;
                community_degrees[best] += ki;
                if best != current {
                    improved = true;
                    any_improved = true;
                }
            }

            if !improved {
                break;
            }
        }

        (communities, any_improved)
    }

    /// Phase 2: contract communities. Returns the next level and, per new
    /// node, the nodes of the current level it absorbed.
    fn aggregate(level: &Level, communities: &[usize]) -> (Level, Vec<Vec<usize>>) {
        let renumbered = Partition::new(communities.to_vec()).renumbered().into_labels();
        let n_new = renumbered.iter().max().map_or(0, |&m| m + 1);

        let mut new_to_old: Vec<Vec<usize>> = vec![Vec::new(); n_new];
        for (node, &c) in renumbered.iter().enumerate() {
            new_to_old[c].push(node);
        }

        let mut new_self_loops = vec![0.0; n_new];
        for (i, &sl) in level.self_loops.iter().enumerate() {
            new_self_loops[renumbered[i]] += sl;
        }

        let mut new_edge_weights: HashMap<(usize, usize), f64> = HashMap::new();
        for &(i, j, w) in &level.edges {
            let (ci, cj) = (renumbered[i], renumbered[j]);
            if ci == cj {
                new_self_loops[ci] += w;
            } else {
                let key = if ci < cj { (ci, cj) } else { (cj, ci) };
                *new_edge_weights.entry(key).or_insert(0.0) += w;
            }
        }

        let mut edges: Vec<(usize, usize, f64)> = new_edge_weights
            .into_iter()
            .map(|((i, j), w)| (i, j, w))
            .collect();
        edges.sort_unstable_by_key(|&(i, j, _)| (i, j));

        (
            Level {
                n: n_new,
                edges,
                self_loops: new_self_loops,
            },
            new_to_old,
        )
    }

    /// Expand a partition of aggregated nodes to the level below.
    fn expand_partition(partition: &[usize], node_mapping: &[Vec<usize>]) -> Vec<usize> {
        let n_below = node_mapping.iter().map(Vec::len).sum();
        let mut result = vec![0; n_below];
        for (agg_node, below) in node_mapping.iter().enumerate() {
            for &orig in below {
                result[orig] = partition[agg_node];
            }
        }
        result
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        let n = graph.node_count();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if graph.edge_count() == 0 {
            return Ok(Partition::singletons(n));
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut self_loops = vec![0.0; n];
        for (i, j, w) in weighted_edges(graph) {
            if i == j {
                self_loops[i] += w;
            } else {
                edges.push((i, j, w));
            }
        }
        let mut level = Level {
            n,
            edges,
            self_loops,
        };

        let mut mapping_stack: Vec<Vec<Vec<usize>>> = Vec::new();
        let mut prev_modularity = f64::NEG_INFINITY;

        for _level in 0..self.max_levels {
            let (partition, improved) = self.local_moving(&level);
            if !improved {
                break;
            }

            let mod_now = self.modularity(&level, &partition);
            if mod_now - prev_modularity < self.min_modularity_gain {
                break;
            }
            prev_modularity = mod_now;

            let (next, node_mapping) = Self::aggregate(&level, &partition);
            if next.n == level.n {
                break;
            }
            mapping_stack.push(node_mapping);
            level = next;
        }

        let mut result: Vec<usize> = (0..level.n).collect();
        while let Some(mapping) = mapping_stack.pop() {
            result = Self::expand_partition(&result, &mapping);
        }

        let partition = Partition::new(result);
        partition
            .validate(graph)
            .map_err(|e| Error::algorithm("louvain", e.to_string()))?;
        Ok(partition.renumbered())
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::UnGraph;

    fn two_triangles() -> UnGraph<(), ()> {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
        for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
            let _ = graph.add_edge(n[a], n[b], ());
        }
        graph
    }

    #[test]
    fn test_louvain_triangle() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let n0 = graph.add_node(());
        let n1 = graph.add_node(());
        let n2 = graph.add_node(());
        let _ = graph.add_edge(n0, n1, ());
        let _ = graph.add_edge(n1, n2, ());
        let _ = graph.add_edge(n0, n2, ());

        let communities = Louvain::new().detect(&graph).unwrap();
        let c = communities.labels();
        assert_eq!(c.len(), 3);
        assert_eq!(c[0], c[1]);
        assert_eq!(c[1], c[2]);
    }

    #[test]
    fn test_louvain_two_cliques() {
        let communities = Louvain::new().detect(&two_triangles()).unwrap();
        let c = communities.labels();
        assert_eq!(c.len(), 6);
        assert_eq!(c[0], c[1]);
        assert_eq!(c[1], c[2]);
        assert_eq!(c[3], c[4]);
        assert_eq!(c[4], c[5]);
        assert_ne!(c[0], c[3]);
    }

    #[test]
    fn test_louvain_reversed_edges_still_counted() {
        // Edges added target-first must not be dropped.
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
        for &(a, b) in &[(1, 0), (2, 1), (2, 0), (4, 3), (5, 4), (5, 3), (3, 2)] {
            let _ = graph.add_edge(n[a], n[b], ());
        }
        let c = Louvain::new().detect(&graph).unwrap().into_labels();
        assert_eq!(c[0], c[2]);
        assert_eq!(c[3], c[5]);
        assert_ne!(c[0], c[3]);
    }

    #[test]
    fn test_louvain_follows_heavy_edges() {
        // Square 0-1-2-3-0 with heavy 0-1 and 2-3.
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let n: Vec<_> = (0..4).map(|_| graph.add_node(())).collect();
        let _ = graph.add_edge(n[0], n[1], 10.0);
        let _ = graph.add_edge(n[1], n[2], 1.0);
        let _ = graph.add_edge(n[2], n[3], 10.0);
        let _ = graph.add_edge(n[3], n[0], 1.0);
        let c = Louvain::new().detect(&graph).unwrap().into_labels();
        assert_eq!(c[0], c[1]);
        assert_eq!(c[2], c[3]);
        assert_ne!(c[0], c[2]);
    }

    #[test]
    fn test_louvain_empty_graph() {
        let graph = UnGraph::<(), ()>::new_undirected();
        assert_eq!(Louvain::new().detect(&graph), Err(Error::EmptyInput));
    }

    #[test]
    fn test_louvain_single_node() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let _ = graph.add_node(());
        let communities = Louvain::new().detect(&graph).unwrap();
        assert_eq!(communities.labels(), &[0]);
    }

    #[test]
    fn test_louvain_disconnected() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let _ = graph.add_node(());
        let _ = graph.add_node(());
        let c = Louvain::new().detect(&graph).unwrap().into_labels();
        assert_eq!(c.len(), 2);
        assert_ne!(c[0], c[1]);
    }
}
