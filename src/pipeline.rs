//! Batch driver: run several detectors on one graph and compare them.
//!
//! For every configured algorithm name the driver builds the detector, runs
//! it, and scores the resulting partition (modularity, size statistics,
//! bubble metrics). A failing algorithm is logged and recorded; the batch
//! keeps going.
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use bubbles::pipeline::{Pipeline, PipelineConfig};
//!
//! let mut g = UnGraph::<(), ()>::new_undirected();
//! let n: Vec<_> = (0..6).map(|_| g.add_node(())).collect();
//! for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
//!     g.add_edge(n[a], n[b], ());
//! }
//!
//! let config = PipelineConfig::from_yaml_str("algorithms: [louvain, nope]").unwrap();
//! let report = Pipeline::new(config).run(&g);
//! assert_eq!(report.comparison().len(), 1);
//! assert_eq!(report.failures().len(), 1);
//! ```

use crate::community::{Algorithm, AlgorithmSettings, CommunityDetection};
use crate::error::{Error, ErrorKind, Result};
use crate::graph::EdgeWeight;
use crate::metrics::{
    ari, bubble_metrics, modularity, nmi, partition_stats, weighted_conductance,
    weighted_internal_density, BubbleMetrics, PartitionStats, MIN_BUBBLE_SIZE,
};
use crate::partition::Partition;
use petgraph::graph::UnGraph;
use std::time::Instant;

/// What to run and how to score it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Algorithm names, in report order.
    pub algorithms: Vec<String>,
    /// Smallest community that gets a bubble record.
    pub min_bubble_size: usize,
    /// How many of the largest communities each run lists.
    pub top_communities: usize,
    /// Detector settings shared by every algorithm.
    #[serde(flatten)]
    pub settings: AlgorithmSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            algorithms: vec!["leiden".to_string()],
            min_bubble_size: MIN_BUBBLE_SIZE,
            top_communities: 10,
            settings: AlgorithmSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document; missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Check that every configured name resolves to a detector and that the
    /// Girvan–Newman cut budget is positive.
    pub fn validate(&self) -> Result<()> {
        if self.algorithms.is_empty() {
            return Err(Error::InvalidParameter {
                name: "algorithms",
                message: "at least one algorithm is required",
            });
        }
        if self.settings.gn_max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "gn_max_iterations",
                message: "must be at least 1",
            });
        }
        for name in &self.algorithms {
            let _ = Algorithm::from_name_with(name, &self.settings)?;
        }
        Ok(())
    }
}

/// Outcome of one successful algorithm run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlgorithmRun {
    /// Canonical detector name.
    pub algorithm: String,
    /// The partition found.
    pub partition: Partition,
    /// Modularity of `partition`, if it covers the graph.
    pub modularity: Option<f64>,
    /// Community size statistics.
    pub stats: PartitionStats,
    /// Communities of at least `min_bubble_size` members.
    pub bubbles: Vec<BubbleMetrics>,
    /// Size-weighted mean conductance of `bubbles`.
    pub weighted_conductance: f64,
    /// Size-weighted mean internal density of `bubbles`.
    pub weighted_internal_density: f64,
    /// `(community, size)` for the largest communities.
    pub top_communities: Vec<(usize, usize)>,
    /// Wall-clock detection time.
    pub runtime_secs: f64,
}

/// One line of the algorithm comparison table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComparisonRow {
    /// Canonical detector name.
    pub algorithm: String,
    /// Modularity (`None` if the partition was empty).
    pub modularity: Option<f64>,
    /// Community count.
    pub num_communities: usize,
    /// Nodes per community.
    pub avg_community_size: f64,
}

/// Agreement between two runs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Agreement {
    /// Normalized mutual information.
    pub nmi: f64,
    /// Adjusted Rand Index.
    pub ari: f64,
}

/// Every configured algorithm with its result, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<(String, Result<AlgorithmRun>)>,
}

impl Report {
    /// All entries as configured.
    pub fn entries(&self) -> &[(String, Result<AlgorithmRun>)] {
        &self.entries
    }

    /// Successful runs.
    pub fn runs(&self) -> impl Iterator<Item = &AlgorithmRun> + '_ {
        self.entries.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    /// The run configured under `name`, if it succeeded.
    pub fn get(&self, name: &str) -> Option<&AlgorithmRun> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, r)| r.as_ref().ok())
    }

    /// Failed algorithms with the kind of their error.
    pub fn failures(&self) -> Vec<(&str, ErrorKind)> {
        self.entries
            .iter()
            .filter_map(|(n, r)| r.as_ref().err().map(|e| (n.as_str(), e.kind())))
            .collect()
    }

    /// Comparison table over the successful runs.
    pub fn comparison(&self) -> Vec<ComparisonRow> {
        self.runs()
            .map(|run| ComparisonRow {
                algorithm: run.algorithm.clone(),
                modularity: run.modularity,
                num_communities: run.stats.num_communities,
                avg_community_size: run.stats.avg_community_size,
            })
            .collect()
    }

    /// NMI and ARI between two successful runs, by configured name.
    pub fn agreement(&self, a: &str, b: &str) -> Option<Agreement> {
        let (a, b) = (self.get(a)?, self.get(b)?);
        Some(Agreement {
            nmi: nmi(&a.partition, &b.partition),
            ari: ari(&a.partition, &b.partition),
        })
    }
}

/// Runs the configured algorithms against a graph.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Driver for `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every configured algorithm in order.
    pub fn run<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Report {
        log::info!(
            "running {} algorithms on {} nodes, {} edges",
            self.config.algorithms.len(),
            graph.node_count(),
            graph.edge_count()
        );
        let entries = self
            .config
            .algorithms
            .iter()
            .map(|name| (name.clone(), self.run_one(name, graph)))
            .collect();
        Report { entries }
    }

    /// Like [`run`](Self::run), with algorithms executed concurrently.
    ///
    /// Entries keep configuration order.
    #[cfg(feature = "parallel")]
    pub fn run_parallel<N: Sync, E: EdgeWeight + Sync>(&self, graph: &UnGraph<N, E>) -> Report {
        use rayon::prelude::*;

        log::info!(
            "running {} algorithms in parallel on {} nodes, {} edges",
            self.config.algorithms.len(),
            graph.node_count(),
            graph.edge_count()
        );
        let entries = self
            .config
            .algorithms
            .par_iter()
            .map(|name| (name.clone(), self.run_one(name, graph)))
            .collect();
        Report { entries }
    }

    /// Run and score one algorithm by name.
    pub fn run_one<N, E: EdgeWeight>(&self, name: &str, graph: &UnGraph<N, E>) -> Result<AlgorithmRun> {
        let result = Algorithm::from_name_with(name, &self.config.settings)
            .and_then(|algorithm| self.evaluate(&algorithm, graph));
        match &result {
            Ok(run) => log::info!(
                "{}: {} communities, modularity {}, {} bubbles, {:.3}s",
                run.algorithm,
                run.stats.num_communities,
                run.modularity
                    .map_or_else(|| "n/a".to_string(), |q| format!("{q:.4}")),
                run.bubbles.len(),
                run.runtime_secs
            ),
            Err(e) => log::warn!("{name} skipped ({}): {e}", e.kind()),
        }
        result
    }

    fn evaluate<N, E: EdgeWeight>(
        &self,
        algorithm: &Algorithm,
        graph: &UnGraph<N, E>,
    ) -> Result<AlgorithmRun> {
        let started = Instant::now();
        let partition = algorithm.detect(graph)?;
        let runtime_secs = started.elapsed().as_secs_f64();

        // An exhausted bounded search yields an empty partition, which has
        // no modularity and no bubbles.
        let bubbles = if partition.covers(graph) {
            bubble_metrics(graph, &partition, self.config.min_bubble_size)?
        } else {
            Vec::new()
        };
        let top_communities = partition
            .index()
            .largest(self.config.top_communities)
            .into_iter()
            .map(|(id, members)| (id, members.len()))
            .collect();

        Ok(AlgorithmRun {
            algorithm: algorithm.name(),
            modularity: modularity(graph, &partition),
            stats: partition_stats(&partition),
            weighted_conductance: weighted_conductance(&bubbles),
            weighted_internal_density: weighted_internal_density(&bubbles),
            bubbles,
            top_communities,
            partition,
            runtime_secs,
        })
    }
}
