//! Quotient (coarsened) graphs.
//!
//! Collapse a graph and a partition into a super-graph whose nodes are the
//! partition's communities:
//!
//! ```text
//!   original                          quotient
//!   1 ─ 2        4                    A ──3── B
//!    \  |      / |
//!     \ |    /   |        A = {1,2,3}, B = {4,5}
//!       3 ─────  5        cross edges: (1,4) (2,4) (3,5)
//! ```
//!
//! - Every distinct community becomes a node, including communities with no
//!   cross edges, so the meta algorithm sees the true community count.
//! - Edges inside a community are dropped; there are no self-loops.
//! - Cross edges accumulate on the unordered community pair, either as a count
//!   or as a weight sum ([`QuotientWeighting`]).
//!
//! Building is a single pass over the original edges. The accumulation map
//! holds one entry per *community pair* that actually shares an edge, never
//! one per node pair.

use crate::error::Result;
use crate::graph::EdgeWeight;
use crate::partition::Partition;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// How crossing edges accumulate into quotient edge weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotientWeighting {
    /// Each crossing edge adds 1.
    #[default]
    Count,
    /// Each crossing edge adds its own weight.
    Summed,
}

/// Weighted super-graph of a partition's communities.
///
/// Node payloads are the original community ids; quotient nodes are laid out
/// in ascending community id order.
#[derive(Debug, Clone)]
pub struct QuotientGraph {
    graph: UnGraph<usize, f64>,
    node_of: HashMap<usize, NodeIndex>,
}

impl QuotientGraph {
    /// Collapse `graph` along `partition`.
    ///
    /// Fails with [`Error::PartitionMismatch`](crate::Error::PartitionMismatch)
    /// if `partition` does not cover `graph`.
    pub fn build<N, E: EdgeWeight>(
        graph: &UnGraph<N, E>,
        partition: &Partition,
        weighting: QuotientWeighting,
    ) -> Result<Self> {
        partition.validate(graph)?;

        let mut communities: Vec<usize> = partition.labels().to_vec();
        communities.sort_unstable();
        communities.dedup();

        let mut quotient = UnGraph::with_capacity(communities.len(), 0);
        let mut node_of = HashMap::with_capacity(communities.len());
        for &c in &communities {
            let _ = node_of.insert(c, quotient.add_node(c));
        }

        let labels = partition.labels();
        let mut pair_weights: HashMap<(NodeIndex, NodeIndex), f64> = HashMap::new();
        for edge in graph.edge_references() {
            let (u, v) = (edge.source().index(), edge.target().index());
            if u == v {
                continue;
            }
            let (cu, cv) = (node_of[&labels[u]], node_of[&labels[v]]);
            if cu == cv {
                continue;
            }
            let key = if cu < cv { (cu, cv) } else { (cv, cu) };
            let w = match weighting {
                QuotientWeighting::Count => 1.0,
                QuotientWeighting::Summed => edge.weight().edge_weight(),
            };
            *pair_weights.entry(key).or_insert(0.0) += w;
        }

        let mut pairs: Vec<_> = pair_weights.into_iter().collect();
        pairs.sort_unstable_by_key(|&(key, _)| key);
        for ((a, b), w) in pairs {
            let _ = quotient.add_edge(a, b, w);
        }

        Ok(Self {
            graph: quotient,
            node_of,
        })
    }

    /// The super-graph itself.
    pub fn graph(&self) -> &UnGraph<usize, f64> {
        &self.graph
    }

    /// Number of super-nodes (communities).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct community pairs that share at least one edge.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Super-node standing for community `community`.
    pub fn node_of(&self, community: usize) -> Option<NodeIndex> {
        self.node_of.get(&community).copied()
    }

    /// Community id of super-node `node`.
    pub fn community_at(&self, node: NodeIndex) -> Option<usize> {
        self.graph.node_weight(node).copied()
    }

    /// Accumulated weight between two communities (`None` if they share no edge).
    pub fn weight_between(&self, a: usize, b: usize) -> Option<f64> {
        let (na, nb) = (self.node_of(a)?, self.node_of(b)?);
        self.graph
            .find_edge(na, nb)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// Nodes 1..=5 of the module example live at indices 0..=4.
    fn two_groups() -> (UnGraph<(), f64>, Partition) {
        let mut g = UnGraph::<(), f64>::new_undirected();
        let n: Vec<_> = (0..5).map(|_| g.add_node(())).collect();
        let _ = g.add_edge(n[0], n[3], 1.0);
        let _ = g.add_edge(n[1], n[3], 2.0);
        let _ = g.add_edge(n[2], n[4], 0.5);
        let _ = g.add_edge(n[0], n[1], 1.0);
        // A = 10, B = 20
        (g, Partition::new(vec![10, 10, 10, 20, 20]))
    }

    #[test]
    fn counts_cross_edges_once_per_pair() {
        let (g, p) = two_groups();
        let q = QuotientGraph::build(&g, &p, QuotientWeighting::Count).unwrap();
        assert_eq!(q.node_count(), 2);
        assert_eq!(q.edge_count(), 1);
        assert_eq!(q.weight_between(10, 20), Some(3.0));
        assert_eq!(q.weight_between(20, 10), Some(3.0));
        assert_eq!(q.weight_between(10, 10), None);
    }

    #[test]
    fn summed_mode_uses_edge_weights() {
        let (g, p) = two_groups();
        let q = QuotientGraph::build(&g, &p, QuotientWeighting::Summed).unwrap();
        assert_eq!(q.weight_between(10, 20), Some(3.5));
    }

    #[test]
    fn isolated_communities_are_kept() {
        let mut g = UnGraph::<(), ()>::new_undirected();
        let a = g.add_node(());
        let b = g.add_node(());
        let _ = g.add_node(());
        let _ = g.add_edge(a, b, ());
        let q = QuotientGraph::build(&g, &Partition::new(vec![0, 0, 1]), QuotientWeighting::Count)
            .unwrap();
        assert_eq!(q.node_count(), 2);
        assert_eq!(q.edge_count(), 0);
    }

    #[test]
    fn nodes_follow_ascending_community_ids() {
        let (g, _) = two_groups();
        let p = Partition::new(vec![42, 7, 7, 3, 42]);
        let q = QuotientGraph::build(&g, &p, QuotientWeighting::Count).unwrap();
        let ids: Vec<usize> = q.graph().node_indices().map(|n| q.graph()[n]).collect();
        assert_eq!(ids, vec![3, 7, 42]);
        assert_eq!(q.community_at(NodeIndex::new(1)), Some(7));
        assert_eq!(q.node_of(42), Some(NodeIndex::new(2)));
    }

    #[test]
    fn rejects_partition_that_does_not_cover() {
        let (g, _) = two_groups();
        let err = QuotientGraph::build(&g, &Partition::new(vec![0; 4]), QuotientWeighting::Count)
            .unwrap_err();
        assert_eq!(err, Error::PartitionMismatch { expected: 5, found: 4 });
    }

    #[test]
    fn self_loops_never_materialize() {
        let mut g = UnGraph::<(), ()>::new_undirected();
        let a = g.add_node(());
        let b = g.add_node(());
        let _ = g.add_edge(a, a, ());
        let _ = g.add_edge(a, b, ());
        let q = QuotientGraph::build(&g, &Partition::new(vec![0, 1]), QuotientWeighting::Count)
            .unwrap();
        assert_eq!(q.edge_count(), 1);
        assert_eq!(q.weight_between(0, 1), Some(1.0));
    }
}
