//! Graph queries used by the detection pipeline and the metrics engine.
//!
//! Graphs are plain `petgraph` undirected graphs. The core only needs a handful
//! of read-only queries: edge weights, degrees, the edge count of an induced
//! node subset, and the cut between a subset and its complement. Everything
//! here works on a boolean membership mask indexed by `NodeIndex::index()`, so a
//! community never needs to be materialized as a subgraph.
//!
//! Degrees follow the usual undirected convention: a self-loop adds 2 to its
//! node's degree and never crosses a cut.

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// Numeric view of an edge payload.
///
/// Unweighted graphs (`()` payloads) read as weight 1.0. Weights are expected
/// to be non-negative.
pub trait EdgeWeight {
    /// Weight of this edge.
    fn edge_weight(&self) -> f64;
}

impl EdgeWeight for () {
    fn edge_weight(&self) -> f64 {
        1.0
    }
}

impl EdgeWeight for f64 {
    fn edge_weight(&self) -> f64 {
        *self
    }
}

impl EdgeWeight for f32 {
    fn edge_weight(&self) -> f64 {
        f64::from(*self)
    }
}

impl EdgeWeight for u32 {
    fn edge_weight(&self) -> f64 {
        f64::from(*self)
    }
}

impl EdgeWeight for u64 {
    fn edge_weight(&self) -> f64 {
        *self as f64
    }
}

impl EdgeWeight for usize {
    fn edge_weight(&self) -> f64 {
        *self as f64
    }
}

/// Weighted edge list `(i, j, w)` with `i <= j`, one entry per graph edge.
pub(crate) fn weighted_edges<N, E: EdgeWeight>(graph: &UnGraph<N, E>) -> Vec<(usize, usize, f64)> {
    graph
        .edge_references()
        .map(|e| {
            let i = e.source().index();
            let j = e.target().index();
            let w = e.weight().edge_weight();
            if i <= j {
                (i, j, w)
            } else {
                (j, i, w)
            }
        })
        .collect()
}

/// Copy of `graph` with the same topology and every edge weight set to 1.0.
pub fn with_unit_weights<N: Clone, E>(graph: &UnGraph<N, E>) -> UnGraph<N, f64> {
    graph.map(|_, n| n.clone(), |_, _| 1.0)
}

/// Unweighted degree of every node (edge count, self-loops counted twice).
pub fn degrees<N, E>(graph: &UnGraph<N, E>) -> Vec<usize> {
    let mut deg = vec![0usize; graph.node_count()];
    for e in graph.edge_references() {
        deg[e.source().index()] += 1;
        deg[e.target().index()] += 1;
    }
    deg
}

/// Weighted degree (strength) of every node.
pub fn weighted_degrees<N, E: EdgeWeight>(graph: &UnGraph<N, E>) -> Vec<f64> {
    let mut deg = vec![0.0; graph.node_count()];
    for e in graph.edge_references() {
        let w = e.weight().edge_weight();
        deg[e.source().index()] += w;
        deg[e.target().index()] += w;
    }
    deg
}

/// Sum of all edge weights (m in the modularity formula).
pub fn total_weight<N, E: EdgeWeight>(graph: &UnGraph<N, E>) -> f64 {
    graph
        .edge_references()
        .map(|e| e.weight().edge_weight())
        .sum()
}

/// Number of edges with both endpoints inside `members`.
///
/// `members[i]` marks node `i`. This is the edge count of the induced subgraph.
pub fn induced_edge_count<N, E>(graph: &UnGraph<N, E>, members: &[bool]) -> usize {
    graph
        .edge_references()
        .filter(|e| inside(members, e.source().index()) && inside(members, e.target().index()))
        .count()
}

/// Number of edges with exactly one endpoint inside `members`.
pub fn cut_size<N, E>(graph: &UnGraph<N, E>, members: &[bool]) -> usize {
    graph
        .edge_references()
        .filter(|e| inside(members, e.source().index()) != inside(members, e.target().index()))
        .count()
}

/// Sum of full-graph degrees of the nodes inside `members`.
pub fn volume(degrees: &[usize], members: &[bool]) -> usize {
    degrees
        .iter()
        .zip(members)
        .filter(|(_, &m)| m)
        .map(|(&d, _)| d)
        .sum()
}

fn inside(members: &[bool], node: usize) -> bool {
    members.get(node).copied().unwrap_or(false)
}
