//! # bubbles
//!
//! Hierarchical community detection on `petgraph` graphs, plus the metrics
//! used to judge the resulting communities ("bubbles").
//!
//! A fast base detector (Louvain, Leiden, label propagation) splits the graph
//! into many small communities. Those collapse into a [`QuotientGraph`], an
//! expensive meta detector (greedy modularity, Girvan–Newman) partitions the
//! quotient, and the answer is projected back onto the original nodes.
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use bubbles::community::{Algorithm, CommunityDetection};
//! use bubbles::metrics::modularity;
//!
//! let mut g = UnGraph::<(), ()>::new_undirected();
//! let n: Vec<_> = (0..6).map(|_| g.add_node(())).collect();
//! for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
//!     g.add_edge(n[a], n[b], ());
//! }
//!
//! let detector: Algorithm = "hierarchical_girvan".parse().unwrap();
//! let partition = detector.detect(&g).unwrap();
//! assert_eq!(partition.community_count(), 2);
//! assert!(modularity(&g, &partition).unwrap() > 0.3);
//! ```
//!
//! The default build is single-threaded. The `parallel` feature lets the
//! [`pipeline`] run independent algorithms concurrently.

pub mod community;
/// Error types used across `bubbles`.
pub mod error;
pub mod graph;
pub mod metrics;
pub mod partition;
pub mod pipeline;
pub mod quotient;

pub use community::{Algorithm, CommunityDetection, Hierarchical};
pub use error::{Error, ErrorKind, Result};
pub use graph::EdgeWeight;
pub use partition::{CommunityIndex, Partition};
pub use pipeline::{Pipeline, PipelineConfig, Report};
pub use quotient::{QuotientGraph, QuotientWeighting};
