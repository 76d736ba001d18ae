//! Detectors that turn a graph into a [`Partition`](crate::Partition).
//!
//! Every detector implements [`CommunityDetection`]. Edge payloads are read
//! through [`EdgeWeight`](crate::EdgeWeight), so the same detector runs on a
//! raw graph and on a weighted quotient.
//!
//! | Detector | Objective | Cost | Role |
//! |----------|-----------|------|------|
//! | [`Louvain`] | modularity, local moves + aggregation | ~O(E) per level | base |
//! | [`Leiden`] | Louvain plus a refinement step that keeps communities connected | ~O(E) per level | base |
//! | [`LabelPropagation`] | majority label by edge weight | O(E) per sweep | base |
//! | [`GreedyModularity`] | best adjacent merge until no gain | slow on large graphs | meta |
//! | [`GirvanNewman`] | best modularity cut among the first [`GN_MAX_ITERATIONS`] splits | betweenness per split | meta |
//!
//! Louvain, Leiden and greedy modularity scale the null-model term of the
//! modularity gain by their `resolution()`. At 1.0 they optimize plain
//! [`modularity`](crate::metrics::modularity), which is also what
//! Girvan–Newman scores its cuts with.
//! Label propagation has two schedules: [`UpdateMode::Synchronous`] is
//! deterministic and [`UpdateMode::Asynchronous`] visits nodes in a shuffled order.
//!
//! [`Hierarchical`] pairs a base detector with a meta detector:
//!
//! ```text
//! graph --base--> partition --contract--> quotient --meta--> meta partition
//!   ^                                                              |
//!   +------------------------- project back ----------------------+
//! ```
//!
//! [`Algorithm`] builds any detector, or any composition, from a name such
//! as `"hierarchical:louvain+girvan_newman"`.
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use bubbles::community::{CommunityDetection, GreedyModularity, Hierarchical, Louvain};
//!
//! // Two triangles joined by one edge
//! let mut graph = UnGraph::<(), ()>::new_undirected();
//! let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
//! for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
//!     graph.add_edge(n[a], n[b], ());
//! }
//!
//! let detector = Hierarchical::new(Louvain::new(), GreedyModularity::new());
//! let partition = detector.detect(&graph).unwrap();
//! assert_eq!(partition.len(), 6);
//! assert_eq!(partition.labels()[0], partition.labels()[2]);
//! ```

mod girvan_newman;
mod greedy;
mod hierarchical;
mod label_prop;
mod leiden;
mod louvain;
mod registry;
mod traits;

pub use girvan_newman::{select_best_cut, GirvanNewman, GirvanNewmanSplits, GN_MAX_ITERATIONS};
pub use greedy::GreedyModularity;
pub use hierarchical::{Hierarchical, HierarchicalRun};
pub use label_prop::{LabelPropagation, UpdateMode};
pub use leiden::Leiden;
pub use louvain::Louvain;
pub use registry::{Algorithm, AlgorithmSettings};
pub use traits::CommunityDetection;
