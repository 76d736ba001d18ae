//! Two-level (coarsening) community detection.
//!
//! ```text
//! G ──base──▶ P_base ──collapse──▶ Q ──meta──▶ P_meta ──compose──▶ P_final
//!                                                 final[n] = meta[q(base[n])]
//! ```
//!
//! A cheap base detector cuts the graph into many small communities; the
//! expensive meta detector only ever sees the quotient graph, whose node
//! count is the number of base communities. Uncoarsening is a pure two-hop
//! lookup and never touches edges again.
//!
//! Invariants:
//! - the final partition covers the input graph;
//! - it has no more communities than the base partition (the meta step can
//!   only merge base communities, never split them).
//!
//! Errors from either phase are returned unchanged. There is no fallback to
//! the base partition.

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{with_unit_weights, EdgeWeight};
use crate::partition::Partition;
use crate::quotient::{QuotientGraph, QuotientWeighting};
use petgraph::graph::UnGraph;

/// Everything a hierarchical run produced, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalRun {
    /// Partition found by the base detector.
    pub base: Partition,
    /// Super-node count of the quotient graph.
    pub quotient_nodes: usize,
    /// Edge count of the quotient graph.
    pub quotient_edges: usize,
    /// Base partition coarsened by the meta detector.
    pub partition: Partition,
}

/// Base detector, quotient graph, meta detector, composed.
#[derive(Debug, Clone)]
pub struct Hierarchical<B, M> {
    base: B,
    meta: M,
    weighting: QuotientWeighting,
    propagate_weights: bool,
}

impl<B, M> Hierarchical<B, M> {
    /// Compose `base` and `meta` with count weighting and weights propagated.
    pub fn new(base: B, meta: M) -> Self {
        Self {
            base,
            meta,
            weighting: QuotientWeighting::Count,
            propagate_weights: true,
        }
    }

    /// How crossing edges accumulate into quotient weight.
    pub fn with_weighting(mut self, weighting: QuotientWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Whether the meta detector sees quotient weights (`true`) or a graph
    /// with every quotient edge at weight 1.0 (`false`).
    pub fn with_propagate_weights(mut self, propagate: bool) -> Self {
        self.propagate_weights = propagate;
        self
    }

    /// The base detector.
    pub fn base(&self) -> &B {
        &self.base
    }

    /// The meta detector.
    pub fn meta(&self) -> &M {
        &self.meta
    }
}

impl<B: CommunityDetection, M: CommunityDetection> Hierarchical<B, M> {
    /// Run all four steps and keep the intermediate results.
    pub fn run<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<HierarchicalRun> {
        let base = self.base.detect(graph)?;
        if !base.covers(graph) {
            return Err(Error::algorithm(
                "hierarchical",
                format!(
                    "base partition describes {} of {} nodes",
                    base.len(),
                    graph.node_count()
                ),
            ));
        }
        log::debug!(
            "hierarchical: base found {} communities",
            base.community_count()
        );

        let quotient = QuotientGraph::build(graph, &base, self.weighting)?;
        let (quotient_nodes, quotient_edges) = (quotient.node_count(), quotient.edge_count());
        log::debug!("hierarchical: quotient has {quotient_nodes} super-nodes, {quotient_edges} edges");

        let meta = if self.propagate_weights {
            self.meta.detect(quotient.graph())?
        } else {
            self.meta.detect(&with_unit_weights(quotient.graph()))?
        };
        if meta.len() != quotient_nodes {
            return Err(Error::algorithm(
                "hierarchical",
                format!(
                    "meta partition describes {} of {quotient_nodes} super-nodes",
                    meta.len()
                ),
            ));
        }

        let mut labels = Vec::with_capacity(base.len());
        for (_, community) in base.iter() {
            let meta_label = quotient
                .node_of(community)
                .and_then(|q| meta.community_of(q.index()))
                .ok_or_else(|| {
                    Error::algorithm("hierarchical", format!("community {community} not in quotient"))
                })?;
            labels.push(meta_label);
        }
        drop(quotient);

        Ok(HierarchicalRun {
            base,
            quotient_nodes,
            quotient_edges,
            partition: Partition::new(labels),
        })
    }
}

impl<B: CommunityDetection, M: CommunityDetection> CommunityDetection for Hierarchical<B, M> {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        self.run(graph).map(|run| run.partition)
    }
}
