//! Partitions and their community membership index.
//!
//! A [`Partition`] is a total node → community mapping stored as a label
//! vector: `labels[i]` is the community of node `i` (petgraph
//! `NodeIndex::index()`). Community ids are opaque; they need not be
//! contiguous or start at zero.
//!
//! Invariants:
//! - A partition *covers* a graph iff `len() == graph.node_count()`.
//! - [`CommunityIndex`] is derived once from a partition and never mutated.

use crate::error::{Error, Result};
use petgraph::graph::UnGraph;
use std::collections::{BTreeMap, HashMap};

/// Assignment of every node to exactly one community.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Partition {
    labels: Vec<usize>,
}

impl Partition {
    /// Wrap a label vector (`labels[i]` = community of node `i`).
    pub fn new(labels: Vec<usize>) -> Self {
        Self { labels }
    }

    /// The partition of nothing.
    ///
    /// Returned by bounded searches that found no usable result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every node in its own community.
    pub fn singletons(n: usize) -> Self {
        Self::new((0..n).collect())
    }

    /// Build from explicit member lists: community `k` is `communities[k]`.
    ///
    /// Fails if a node index is `>= n`, appears twice, or is never assigned.
    pub fn from_communities(n: usize, communities: &[Vec<usize>]) -> Result<Self> {
        let mut labels = vec![usize::MAX; n];
        let mut assigned = 0usize;
        for (k, members) in communities.iter().enumerate() {
            for &node in members {
                match labels.get_mut(node) {
                    Some(slot) if *slot == usize::MAX => {
                        *slot = k;
                        assigned += 1;
                    }
                    Some(_) => {
                        return Err(Error::InvalidParameter {
                            name: "communities",
                            message: "node assigned to more than one community",
                        })
                    }
                    None => {
                        return Err(Error::PartitionMismatch {
                            expected: n,
                            found: node + 1,
                        })
                    }
                }
            }
        }
        if assigned != n {
            return Err(Error::PartitionMismatch {
                expected: n,
                found: assigned,
            });
        }
        Ok(Self { labels })
    }

    /// Number of nodes described.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if no node is described.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Raw label slice.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Consume into the label vector.
    pub fn into_labels(self) -> Vec<usize> {
        self.labels
    }

    /// Community of `node`, if the partition describes it.
    pub fn community_of(&self, node: usize) -> Option<usize> {
        self.labels.get(node).copied()
    }

    /// Iterate `(node, community)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.labels.iter().copied().enumerate()
    }

    /// Number of distinct communities.
    pub fn community_count(&self) -> usize {
        let mut ids = self.labels.clone();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// True if this partition describes exactly the nodes of `graph`.
    pub fn covers<N, E>(&self, graph: &UnGraph<N, E>) -> bool {
        self.labels.len() == graph.node_count()
    }

    /// Fail with [`Error::PartitionMismatch`] unless this partition covers `graph`.
    pub fn validate<N, E>(&self, graph: &UnGraph<N, E>) -> Result<()> {
        if self.covers(graph) {
            Ok(())
        } else {
            Err(Error::PartitionMismatch {
                expected: graph.node_count(),
                found: self.labels.len(),
            })
        }
    }

    /// Relabel communities to `0..k` in first-seen node order.
    pub fn renumbered(&self) -> Self {
        let mut map: HashMap<usize, usize> = HashMap::new();
        let labels = self
            .labels
            .iter()
            .map(|&l| {
                let next = map.len();
                *map.entry(l).or_insert(next)
            })
            .collect();
        Self { labels }
    }

    /// Community id → members view.
    pub fn index(&self) -> CommunityIndex {
        CommunityIndex::new(self)
    }
}

impl From<Vec<usize>> for Partition {
    fn from(labels: Vec<usize>) -> Self {
        Self::new(labels)
    }
}

/// Community id → member nodes, built once per partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityIndex {
    members: BTreeMap<usize, Vec<usize>>,
}

impl CommunityIndex {
    /// Group the nodes of `partition` by community.
    pub fn new(partition: &Partition) -> Self {
        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (node, comm) in partition.iter() {
            members.entry(comm).or_default().push(node);
        }
        Self { members }
    }

    /// Number of communities.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if there are no communities.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members of community `id`.
    pub fn members(&self, id: usize) -> Option<&[usize]> {
        self.members.get(&id).map(Vec::as_slice)
    }

    /// Iterate `(id, members)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.members.iter().map(|(&id, m)| (id, m.as_slice()))
    }

    /// Community sizes in ascending id order.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.values().map(Vec::len)
    }

    /// Communities ordered by descending size, ties by ascending id.
    pub fn by_size(&self) -> Vec<(usize, &[usize])> {
        let mut out: Vec<(usize, &[usize])> = self.iter().collect();
        // Stable sort keeps the ascending-id order among equal sizes.
        out.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        out
    }

    /// The `k` largest communities, in [`by_size`](Self::by_size) order.
    pub fn largest(&self, k: usize) -> Vec<(usize, &[usize])> {
        let mut out = self.by_size();
        out.truncate(k);
        out
    }
}
