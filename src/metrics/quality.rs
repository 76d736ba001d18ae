//! Whole-partition quality: modularity and size statistics.

use crate::graph::{total_weight, weighted_degrees, weighted_edges, EdgeWeight};
use crate::partition::Partition;
use petgraph::graph::UnGraph;
use std::collections::HashMap;

/// Weighted Newman–Girvan modularity at resolution 1.
///
/// ```text
/// Q = Σ_c [ L_c / m − (d_c / 2m)² ]
/// ```
///
/// with `L_c` the edge weight inside community `c`, `d_c` the summed weighted
/// degree of its members and `m` the total edge weight.
///
/// Returns `None` (and logs a warning) when `partition` does not cover
/// `graph`. A graph without edge weight scores 0.0.
pub fn modularity<N, E: EdgeWeight>(graph: &UnGraph<N, E>, partition: &Partition) -> Option<f64> {
    if !partition.covers(graph) {
        log::warn!(
            "modularity: partition describes {} nodes, graph has {}",
            partition.len(),
            graph.node_count()
        );
        return None;
    }

    let m = total_weight(graph);
    if m <= 0.0 {
        return Some(0.0);
    }
    let labels = partition.labels();

    let mut internal: HashMap<usize, f64> = HashMap::new();
    for (i, j, w) in weighted_edges(graph) {
        if labels[i] == labels[j] {
            *internal.entry(labels[i]).or_insert(0.0) += w;
        }
    }
    let mut degree_sum: HashMap<usize, f64> = HashMap::new();
    for (node, k) in weighted_degrees(graph).into_iter().enumerate() {
        *degree_sum.entry(labels[node]).or_insert(0.0) += k;
    }

    let q = degree_sum
        .iter()
        .map(|(c, &d)| {
            let l = internal.get(c).copied().unwrap_or(0.0);
            l / m - (d / (2.0 * m)).powi(2)
        })
        .sum();
    Some(q)
}

/// Size summary of a partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct PartitionStats {
    /// Number of distinct communities.
    pub num_communities: usize,
    /// Largest community size.
    pub max_community_size: usize,
    /// Smallest community size.
    pub min_community_size: usize,
    /// Nodes per community.
    pub avg_community_size: f64,
}

/// Count and size statistics; all zero for an empty partition.
pub fn partition_stats(partition: &Partition) -> PartitionStats {
    let index = partition.index();
    if index.is_empty() {
        return PartitionStats::default();
    }
    let sizes: Vec<usize> = index.sizes().collect();
    PartitionStats {
        num_communities: sizes.len(),
        max_community_size: sizes.iter().copied().max().unwrap_or(0),
        min_community_size: sizes.iter().copied().min().unwrap_or(0),
        avg_community_size: partition.len() as f64 / sizes.len() as f64,
    }
}
