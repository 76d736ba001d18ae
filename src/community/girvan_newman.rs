//! Girvan–Newman divisive clustering with a bounded best-cut search.
//!
//! The divisive procedure repeatedly deletes the edge with the highest edge
//! betweenness; every time the number of connected components grows, the
//! component structure is one more (finer) partition in the sequence:
//!
//! ```text
//! step 0: {0,1,2,3,4,5}            (bridge 2-3 has top betweenness)
//! step 1: {0,1,2} {3,4,5}
//! step 2: {0} {1,2} {3,4,5}
//! ...
//! ```
//!
//! Every step recomputes betweenness from scratch (Brandes, O(V·E)), so the
//! whole sequence costs O(E²·V). [`GirvanNewman`] therefore only looks at a
//! bounded prefix of the sequence ([`GN_MAX_ITERATIONS`] by default) and keeps
//! the cut with the highest modularity, see [`select_best_cut`].
//!
//! Betweenness is computed on the unweighted topology; weights only enter
//! through the modularity used to pick the cut.
//!
//! ## References
//!
//! Girvan & Newman (2002). "Community structure in social and biological
//! networks." PNAS 99(12).
//! Brandes (2001). "A faster algorithm for betweenness centrality."

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::EdgeWeight;
use crate::metrics::modularity;
use crate::partition::Partition;
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Default number of sequence steps examined by [`GirvanNewman`].
pub const GN_MAX_ITERATIONS: usize = 20;

/// Edge count above which a run is expected to take very long.
const LARGE_GRAPH_EDGES: usize = 10_000;

/// Girvan–Newman community detection (best modularity among the first cuts).
#[derive(Debug, Clone)]
pub struct GirvanNewman {
    max_iterations: usize,
}

impl GirvanNewman {
    /// Create a detector examining [`GN_MAX_ITERATIONS`] cuts.
    pub fn new() -> Self {
        Self {
            max_iterations: GN_MAX_ITERATIONS,
        }
    }

    /// Set how many cuts of the sequence are examined.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The (unbounded) sequence of increasingly fine partitions of `graph`.
    pub fn splits<N, E>(graph: &UnGraph<N, E>) -> GirvanNewmanSplits {
        GirvanNewmanSplits::new(graph)
    }
}

impl Default for GirvanNewman {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for GirvanNewman {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }
        if graph.edge_count() > LARGE_GRAPH_EDGES {
            log::warn!(
                "girvan_newman on {} edges: each step recomputes all betweenness values",
                graph.edge_count()
            );
        }

        select_best_cut(Self::splits(graph), self.max_iterations, |candidate| {
            let score = modularity(graph, candidate);
            log::debug!(
                "girvan_newman: {} communities, modularity {:?}",
                candidate.community_count(),
                score
            );
            score
        })
    }
}

/// Keep the best-scoring partition among the first `max_iterations` candidates.
///
/// - Only strict improvements replace the incumbent, so ties keep the earlier
///   (coarser) partition.
/// - Candidates scoring `None` or a non-finite value are skipped.
/// - An error from the sequence ends the search: the best partition so far
///   is returned if there is one, otherwise the error is.
/// - If nothing qualifies, the result is [`Partition::empty`].
pub fn select_best_cut<I, F>(candidates: I, max_iterations: usize, mut score: F) -> Result<Partition>
where
    I: IntoIterator<Item = Result<Partition>>,
    F: FnMut(&Partition) -> Option<f64>,
{
    let mut best: Option<(f64, Partition)> = None;

    for candidate in candidates.into_iter().take(max_iterations) {
        let partition = match candidate {
            Ok(p) => p,
            Err(e) => {
                return match best {
                    Some((_, p)) => {
                        log::warn!("cut sequence failed ({e}); keeping best cut so far");
                        Ok(p)
                    }
                    None => Err(e),
                };
            }
        };

        let Some(s) = score(&partition).filter(|s| s.is_finite()) else {
            continue;
        };
        if best.as_ref().map_or(true, |(b, _)| s > *b) {
            best = Some((s, partition));
        }
    }

    Ok(best.map(|(_, p)| p).unwrap_or_else(Partition::empty))
}

/// Iterator over the Girvan–Newman partition sequence.
///
/// Owns a simple, unweighted copy of the topology; the source graph is not
/// borrowed.
#[derive(Debug, Clone)]
pub struct GirvanNewmanSplits {
    adj: Vec<BTreeSet<usize>>,
    components: usize,
    started: bool,
}

impl GirvanNewmanSplits {
    fn new<N, E>(graph: &UnGraph<N, E>) -> Self {
        let mut adj = vec![BTreeSet::new(); graph.node_count()];
        for e in graph.edge_references() {
            let (i, j) = (e.source().index(), e.target().index());
            if i != j {
                let _ = adj[i].insert(j);
                let _ = adj[j].insert(i);
            }
        }
        let components = component_labels(&adj).1;
        Self {
            adj,
            components,
            started: false,
        }
    }

    fn has_edges(&self) -> bool {
        self.adj.iter().any(|n| !n.is_empty())
    }

    /// Remove the single edge of highest betweenness (first in node order on ties).
    fn remove_top_edge(&mut self) {
        let scores = edge_betweenness(&self.adj);
        let mut top: Option<((usize, usize), f64)> = None;
        for (&edge, &score) in &scores {
            if top.map_or(true, |(_, t)| score > t) {
                top = Some((edge, score));
            }
        }
        if let Some(((u, v), _)) = top {
            let _ = self.adj[u].remove(&v);
            let _ = self.adj[v].remove(&u);
        }
    }
}

impl Iterator for GirvanNewmanSplits {
    type Item = Result<Partition>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_edges() {
            // An edgeless graph has exactly one cut: its components.
            if self.started {
                return None;
            }
            self.started = true;
            return Some(Ok(Partition::new(component_labels(&self.adj).0)));
        }
        self.started = true;

        loop {
            self.remove_top_edge();
            let (labels, count) = component_labels(&self.adj);
            if count > self.components || !self.has_edges() {
                self.components = count;
                return Some(Ok(Partition::new(labels)));
            }
        }
    }
}

/// Component label per node (BFS in node order) and the component count.
fn component_labels(adj: &[BTreeSet<usize>]) -> (Vec<usize>, usize) {
    let n = adj.len();
    let mut labels = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    let mut comp = 0usize;

    for start in 0..n {
        if labels[start] != usize::MAX {
            continue;
        }
        labels[start] = comp;
        queue.push_back(start);
        while let Some(u) = queue.pop_front() {
            for &v in &adj[u] {
                if labels[v] == usize::MAX {
                    labels[v] = comp;
                    queue.push_back(v);
                }
            }
        }
        comp += 1;
    }

    (labels, comp)
}

/// Unweighted edge betweenness (Brandes), keyed by `(min, max)` endpoint pair.
fn edge_betweenness(adj: &[BTreeSet<usize>]) -> BTreeMap<(usize, usize), f64> {
    let n = adj.len();
    let mut scores: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for source in 0..n {
        let mut stack: Vec<usize> = Vec::new();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut num_paths = vec![0.0f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        num_paths[source] = 1.0;
        distance[source] = Some(0);

        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = distance[v].unwrap_or(0);
            for &w in &adj[v] {
                if distance[w].is_none() {
                    distance[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if distance[w] == Some(dv + 1) {
                    num_paths[w] += num_paths[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut dependency = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                let contrib = num_paths[v] / num_paths[w] * (1.0 + dependency[w]);
                let key = if v < w { (v, w) } else { (w, v) };
                *scores.entry(key).or_insert(0.0) += contrib;
                dependency[v] += contrib;
            }
        }
    }

    // Each undirected path was counted from both ends.
    for s in scores.values_mut() {
        *s /= 2.0;
    }
    scores
}
