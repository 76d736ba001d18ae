//! Per-community ("bubble") structure.
//!
//! For a community S in a graph with |E| edges:
//!
//! ```text
//! internal_density = internal_edges(S) / (|S|·(|S|−1)/2)
//! cut_size         = #edges with exactly one endpoint in S
//! conductance      = cut_size / min(vol(S), 2|E| − vol(S))
//! ```
//!
//! Counts and degrees are unweighted, and `vol` uses degrees in the full
//! graph. Degenerate denominators give 0 rather than an error.

use crate::error::Result;
use crate::partition::Partition;
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Smallest community that gets a bubble record by default.
pub const MIN_BUBBLE_SIZE: usize = 10;

/// Structure of one community.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BubbleMetrics {
    /// Community id in the source partition.
    pub community: usize,
    /// Member count.
    pub size: usize,
    /// Fraction of possible member pairs that are joined by an edge.
    pub internal_density: f64,
    /// Edges leaving the community.
    pub cut_size: usize,
    /// Cut relative to the smaller side's volume.
    pub conductance: f64,
}

/// Edge tallies of one community.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    internal: usize,
    cut: usize,
    volume: usize,
}

/// Bubble records for every community with at least `min_size` members,
/// ordered by descending size, then ascending community id.
///
/// One pass over the edges tallies every community at once.
///
/// Fails with [`Error::PartitionMismatch`](crate::Error::PartitionMismatch)
/// if `partition` does not cover `graph`.
pub fn bubble_metrics<N, E>(
    graph: &UnGraph<N, E>,
    partition: &Partition,
    min_size: usize,
) -> Result<Vec<BubbleMetrics>> {
    partition.validate(graph)?;

    let labels = partition.labels();
    let mut tallies: HashMap<usize, Tally> = HashMap::new();
    for e in graph.edge_references() {
        let (cu, cv) = (labels[e.source().index()], labels[e.target().index()]);
        if cu == cv {
            let t = tallies.entry(cu).or_default();
            t.internal += 1;
            t.volume += 2;
        } else {
            let t = tallies.entry(cu).or_default();
            t.cut += 1;
            t.volume += 1;
            let t = tallies.entry(cv).or_default();
            t.cut += 1;
            t.volume += 1;
        }
    }

    let two_e = 2 * graph.edge_count();
    let index = partition.index();
    let mut out = Vec::new();
    for (community, members) in index.by_size() {
        let size = members.len();
        if size < min_size {
            break;
        }
        let tally = tallies.get(&community).copied().unwrap_or_default();

        let possible = size * size.saturating_sub(1) / 2;
        let internal_density = if possible == 0 {
            0.0
        } else {
            tally.internal as f64 / possible as f64
        };
        let denom = tally.volume.min(two_e.saturating_sub(tally.volume));
        let conductance = if denom == 0 {
            0.0
        } else {
            tally.cut as f64 / denom as f64
        };

        out.push(BubbleMetrics {
            community,
            size,
            internal_density,
            cut_size: tally.cut,
            conductance,
        });
    }
    Ok(out)
}

/// Size-weighted mean conductance; 0.0 when there are no bubbles.
pub fn weighted_conductance(bubbles: &[BubbleMetrics]) -> f64 {
    size_weighted_mean(bubbles, |b| b.conductance)
}

/// Size-weighted mean internal density; 0.0 when there are no bubbles.
pub fn weighted_internal_density(bubbles: &[BubbleMetrics]) -> f64 {
    size_weighted_mean(bubbles, |b| b.internal_density)
}

fn size_weighted_mean(bubbles: &[BubbleMetrics], value: impl Fn(&BubbleMetrics) -> f64) -> f64 {
    let total: usize = bubbles.iter().map(|b| b.size).sum();
    if total == 0 {
        return 0.0;
    }
    bubbles.iter().map(|b| b.size as f64 * value(b)).sum::<f64>() / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{cut_size, degrees, induced_edge_count, volume};
    use crate::metrics::partition_stats;
    use crate::ErrorKind;
    use petgraph::graph::NodeIndex;
    use proptest::prelude::*;

    fn ring(n: usize) -> UnGraph<(), ()> {
        let mut g = UnGraph::<(), ()>::new_undirected();
        let nodes: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
        for i in 0..n {
            let _ = g.add_edge(nodes[i], nodes[(i + 1) % n], ());
        }
        g
    }

    fn bubble(size: usize, conductance: f64) -> BubbleMetrics {
        BubbleMetrics {
            community: 0,
            size,
            internal_density: 0.5,
            cut_size: 0,
            conductance,
        }
    }

    #[test]
    fn ring_halves() {
        // 4-ring split in two: each side has 1 internal edge, 2 cut edges,
        // volume 4 of 8.
        let g = ring(4);
        let p = Partition::new(vec![0, 0, 1, 1]);
        let bubbles = bubble_metrics(&g, &p, 2).unwrap();
        assert_eq!(bubbles.len(), 2);
        for b in &bubbles {
            assert_eq!(b.size, 2);
            assert_eq!(b.cut_size, 2);
            assert!((b.internal_density - 1.0).abs() < 1e-12);
            assert!((b.conductance - 0.5).abs() < 1e-12);
        }
        assert_eq!(bubbles[0].community, 0);
    }

    #[test]
    fn small_ring_has_no_bubbles_at_default_size() {
        let g = ring(4);
        let p = Partition::new(vec![0, 0, 1, 1]);
        assert!(bubble_metrics(&g, &p, MIN_BUBBLE_SIZE).unwrap().is_empty());
        let stats = partition_stats(&p);
        assert_eq!(stats.num_communities, 2);
        assert!((stats.avg_community_size - 2.0).abs() < 1e-12);
    }

    #[test]
    fn single_node_community_has_zero_density() {
        let g = ring(3);
        let p = Partition::new(vec![0, 1, 1]);
        let bubbles = bubble_metrics(&g, &p, 1).unwrap();
        let single = bubbles.iter().find(|b| b.size == 1).unwrap();
        assert_eq!(single.internal_density, 0.0);
    }

    #[test]
    fn edgeless_graph_has_zero_conductance() {
        let mut g = UnGraph::<(), ()>::new_undirected();
        for _ in 0..3 {
            let _ = g.add_node(());
        }
        let bubbles = bubble_metrics(&g, &Partition::new(vec![0, 0, 1]), 1).unwrap();
        assert!(bubbles.iter().all(|b| b.conductance == 0.0));
    }

    #[test]
    fn ordering_is_size_then_id() {
        let g = ring(7);
        let p = Partition::new(vec![5, 5, 2, 2, 9, 9, 9]);
        let ids: Vec<usize> = bubble_metrics(&g, &p, 1)
            .unwrap()
            .iter()
            .map(|b| b.community)
            .collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn many_communities_on_a_long_ring() {
        // 3000-ring cut into 300 arcs of 10: 9 internal edges, 2 cut edges,
        // volume 20 of 6000 each.
        let g = ring(3000);
        let p = Partition::new((0..3000).map(|i| i / 10).collect());
        let bubbles = bubble_metrics(&g, &p, MIN_BUBBLE_SIZE).unwrap();
        assert_eq!(bubbles.len(), 300);
        assert_eq!(bubbles[0].community, 0);
        assert_eq!(bubbles[299].community, 299);
        for b in &bubbles {
            assert_eq!(b.cut_size, 2);
            assert!((b.internal_density - 0.2).abs() < 1e-12);
            assert!((b.conductance - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn uncovered_graph_is_rejected() {
        let err = bubble_metrics(&ring(4), &Partition::new(vec![0, 0]), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidGraphInput);
    }

    #[test]
    fn equal_sizes_give_plain_mean() {
        let bubbles = vec![bubble(12, 0.1), bubble(12, 0.3), bubble(12, 0.8)];
        let plain = (0.1 + 0.3 + 0.8) / 3.0;
        assert!((weighted_conductance(&bubbles) - plain).abs() < 1e-12);
    }

    #[test]
    fn larger_bubbles_weigh_more() {
        let bubbles = vec![bubble(30, 0.1), bubble(10, 0.5)];
        assert!((weighted_conductance(&bubbles) - 0.2).abs() < 1e-12);
        assert!((weighted_internal_density(&bubbles) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn no_bubbles_means_zero_aggregates() {
        assert_eq!(weighted_conductance(&[]), 0.0);
        assert_eq!(weighted_internal_density(&[]), 0.0);
    }

    fn arb_labelled_graph() -> impl Strategy<Value = (UnGraph<(), ()>, Vec<usize>)> {
        (2usize..25).prop_flat_map(|n| {
            (
                proptest::collection::vec((0..n, 0..n), 1..(3 * n)),
                proptest::collection::vec(0..4usize, n),
            )
                .prop_map(move |(pairs, labels)| {
                    let mut g = UnGraph::<(), ()>::new_undirected();
                    for _ in 0..n {
                        let _ = g.add_node(());
                    }
                    for (a, b) in pairs {
                        let _ = g.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
                    }
                    (g, labels)
                })
        })
    }

    proptest! {
        #[test]
        fn single_pass_matches_subset_queries((g, labels) in arb_labelled_graph()) {
            let p = Partition::new(labels);
            let deg = degrees(&g);
            let two_e = 2 * g.edge_count();
            for b in bubble_metrics(&g, &p, 1).unwrap() {
                let mask: Vec<bool> = p.labels().iter().map(|&l| l == b.community).collect();
                let cut = cut_size(&g, &mask);
                prop_assert_eq!(b.cut_size, cut);
                let possible = b.size * (b.size - 1) / 2;
                if possible > 0 {
                    let density = induced_edge_count(&g, &mask) as f64 / possible as f64;
                    prop_assert!((b.internal_density - density).abs() < 1e-12);
                }
                let vol = volume(&deg, &mask);
                let denom = vol.min(two_e - vol);
                if denom > 0 {
                    prop_assert!((b.conductance - cut as f64 / denom as f64).abs() < 1e-12);
                }
            }
        }

        #[test]
        fn conductance_is_a_fraction((g, labels) in arb_labelled_graph()) {
            let bubbles = bubble_metrics(&g, &Partition::new(labels), 1).unwrap();
            for b in &bubbles {
                prop_assert!((0.0..=1.0).contains(&b.conductance), "{b:?}");
                prop_assert!(b.cut_size <= g.edge_count());
            }
            let wc = weighted_conductance(&bubbles);
            prop_assert!((0.0..=1.0).contains(&wc));
        }
    }
}
