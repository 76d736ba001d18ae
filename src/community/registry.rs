//! Name-addressable detectors.
//!
//! [`Algorithm`] wraps every detector in the crate behind one enum so that a
//! driver can select and compose them from configuration strings:
//!
//! | Name | Detector |
//! |------|----------|
//! | `louvain` | [`Louvain`] |
//! | `leiden` | [`Leiden`] |
//! | `label_propagation` | [`LabelPropagation`], synchronous |
//! | `asyn_lpa` | [`LabelPropagation`], asynchronous |
//! | `greedy_modularity` | [`GreedyModularity`] |
//! | `girvan_newman` | [`GirvanNewman`] |
//! | `hierarchical:<base>+<meta>` | [`Hierarchical`] |
//! | `hierarchical_<meta>` | [`Hierarchical`] with a Louvain base |
//!
//! `hierarchical_greedy` and `hierarchical_girvan` are accepted as aliases for
//! the Louvain-based greedy-modularity and Girvan–Newman compositions.

use super::girvan_newman::GN_MAX_ITERATIONS;
use super::{
    CommunityDetection, GirvanNewman, GreedyModularity, Hierarchical, LabelPropagation, Leiden,
    Louvain, UpdateMode,
};
use crate::error::{Error, Result};
use crate::graph::EdgeWeight;
use crate::partition::Partition;
use crate::quotient::QuotientWeighting;
use petgraph::graph::UnGraph;
use std::fmt;
use std::str::FromStr;

/// Knobs shared by every detector built from a name.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AlgorithmSettings {
    /// Seed for randomized detectors (`None` = fresh entropy for label propagation).
    pub seed: Option<u64>,
    /// Girvan–Newman cut budget.
    pub gn_max_iterations: usize,
    /// Quotient edge accumulation for hierarchical runs.
    pub quotient_weighting: QuotientWeighting,
    /// Whether hierarchical meta detectors see quotient weights.
    pub propagate_weights: bool,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            seed: None,
            gn_max_iterations: GN_MAX_ITERATIONS,
            quotient_weighting: QuotientWeighting::Count,
            propagate_weights: true,
        }
    }
}

/// Any detector in the crate, selectable by name.
#[derive(Debug, Clone)]
pub enum Algorithm {
    /// Louvain.
    Louvain(Louvain),
    /// Leiden.
    Leiden(Leiden),
    /// Label propagation (either schedule).
    LabelPropagation(LabelPropagation),
    /// Clauset–Newman–Moore greedy modularity.
    GreedyModularity(GreedyModularity),
    /// Girvan–Newman best cut.
    GirvanNewman(GirvanNewman),
    /// Two-level composition.
    Hierarchical(Box<Hierarchical<Algorithm, Algorithm>>),
}

impl Algorithm {
    /// Build a detector from its stable name with default settings.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_name_with(name, &AlgorithmSettings::default())
    }

    /// Build a detector from its stable name.
    pub fn from_name_with(name: &str, settings: &AlgorithmSettings) -> Result<Self> {
        let name = name.trim();
        if let Some(pair) = name.strip_prefix("hierarchical:") {
            let (base, meta) = pair
                .split_once('+')
                .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))?;
            return Ok(Self::hierarchical(
                Self::from_name_with(base, settings)?,
                Self::from_name_with(meta, settings)?,
                settings,
            ));
        }
        if let Some(meta) = name.strip_prefix("hierarchical_") {
            let meta = match meta {
                "greedy" => "greedy_modularity",
                "girvan" => "girvan_newman",
                other => other,
            };
            return Ok(Self::hierarchical(
                Self::Louvain(Louvain::new()),
                Self::from_name_with(meta, settings)?,
                settings,
            ));
        }

        let algorithm = match name {
            "louvain" => Self::Louvain(Louvain::new()),
            "leiden" => {
                let leiden = Leiden::new();
                Self::Leiden(match settings.seed {
                    Some(seed) => leiden.with_seed(seed),
                    None => leiden,
                })
            }
            "label_propagation" => Self::LabelPropagation(Self::lpa(UpdateMode::Synchronous, settings)),
            "asyn_lpa" => Self::LabelPropagation(Self::lpa(UpdateMode::Asynchronous, settings)),
            "greedy_modularity" => Self::GreedyModularity(GreedyModularity::new()),
            "girvan_newman" => Self::GirvanNewman(
                GirvanNewman::new().with_max_iterations(settings.gn_max_iterations),
            ),
            _ => return Err(Error::UnknownAlgorithm(name.to_string())),
        };
        Ok(algorithm)
    }

    fn lpa(mode: UpdateMode, settings: &AlgorithmSettings) -> LabelPropagation {
        let lpa = LabelPropagation::new().with_mode(mode);
        match settings.seed {
            Some(seed) => lpa.with_seed(seed),
            None => lpa,
        }
    }

    /// Compose `base` and `meta` with the quotient options of `settings`.
    pub fn hierarchical(base: Algorithm, meta: Algorithm, settings: &AlgorithmSettings) -> Self {
        Self::Hierarchical(Box::new(
            Hierarchical::new(base, meta)
                .with_weighting(settings.quotient_weighting)
                .with_propagate_weights(settings.propagate_weights),
        ))
    }

    /// Stable name; parses back to an equivalent detector.
    pub fn name(&self) -> String {
        match self {
            Self::Louvain(_) => "louvain".to_string(),
            Self::Leiden(_) => "leiden".to_string(),
            Self::LabelPropagation(lp) => match lp.mode() {
                UpdateMode::Synchronous => "label_propagation".to_string(),
                UpdateMode::Asynchronous => "asyn_lpa".to_string(),
            },
            Self::GreedyModularity(_) => "greedy_modularity".to_string(),
            Self::GirvanNewman(_) => "girvan_newman".to_string(),
            Self::Hierarchical(h) => {
                format!("hierarchical:{}+{}", h.base().name(), h.meta().name())
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl CommunityDetection for Algorithm {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Partition> {
        match self {
            Self::Louvain(a) => a.detect(graph),
            Self::Leiden(a) => a.detect(graph),
            Self::LabelPropagation(a) => a.detect(graph),
            Self::GreedyModularity(a) => a.detect(graph),
            Self::GirvanNewman(a) => a.detect(graph),
            Self::Hierarchical(a) => a.detect(graph),
        }
    }

    fn resolution(&self) -> f64 {
        match self {
            Self::Louvain(a) => a.resolution(),
            Self::Leiden(a) => a.resolution(),
            Self::GreedyModularity(a) => a.resolution(),
            Self::LabelPropagation(_) | Self::GirvanNewman(_) | Self::Hierarchical(_) => 1.0,
        }
    }
}
