//! Partition evaluation.
//!
//! # Metrics Overview
//!
//! | Metric | Scope | Range | Notes |
//! |--------|-------|-------|-------|
//! | [`modularity`] | partition | [-0.5, 1) | weighted, resolution 1 |
//! | [`partition_stats`] | partition | counts | community sizes |
//! | [`bubble_metrics`] | community | [0, 1] | density, cut, conductance |
//! | [`weighted_conductance`] | bubbles | [0, 1] | size-weighted mean |
//! | [`nmi`] / [`ari`] | two partitions | [0, 1] / [-1, 1] | agreement |
//!
//! None of these fail on degenerate input: empty partitions give zero stats,
//! zero denominators give 0.0, and a non-covering partition gives no
//! modularity. Only [`bubble_metrics`] returns an error, because it indexes
//! the graph by partition label.
//!
//! # Example
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use bubbles::metrics::{bubble_metrics, modularity, partition_stats};
//! use bubbles::Partition;
//!
//! let mut g = UnGraph::<(), ()>::new_undirected();
//! let n: Vec<_> = (0..6).map(|_| g.add_node(())).collect();
//! for i in 0..6 {
//!     g.add_edge(n[i], n[(i + 1) % 6], ());
//! }
//! let p = Partition::new(vec![0, 0, 0, 1, 1, 1]);
//!
//! assert!(modularity(&g, &p).unwrap() > 0.0);
//! assert_eq!(partition_stats(&p).num_communities, 2);
//! assert_eq!(bubble_metrics(&g, &p, 3).unwrap()[0].cut_size, 2);
//! ```

mod agreement;
mod bubble;
mod quality;

pub use agreement::{ari, nmi};
pub use bubble::{
    bubble_metrics, weighted_conductance, weighted_internal_density, BubbleMetrics,
    MIN_BUBBLE_SIZE,
};
pub use quality::{modularity, partition_stats, PartitionStats};
