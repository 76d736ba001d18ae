//! Community detection traits.

use crate::error::Result;
use crate::graph::EdgeWeight;
use crate::partition::Partition;
use petgraph::graph::UnGraph;

/// Trait for community detection algorithms.
///
/// Implementations must return a partition covering exactly the nodes of
/// `graph` and should bias their merges by edge weight, since the same
/// detector may be run on a weighted quotient graph.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition>;

    /// Get the resolution parameter (if applicable).
    fn resolution(&self) -> f64 {
        1.0
    }
}

impl<T: CommunityDetection + ?Sized> CommunityDetection for &T {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        (**self).detect(graph)
    }

    fn resolution(&self) -> f64 {
        (**self).resolution()
    }
}
