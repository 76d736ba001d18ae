use core::fmt;

/// Result alias for `bubbles`.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// The batch driver uses this to report *why* an algorithm was skipped; the
/// orchestrator never changes the kind of an error it forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// The graph or partition violates a structural assumption.
    InvalidGraphInput,
    /// A detection algorithm could not produce a partition.
    AlgorithmFailure,
    /// A configuration value (parameter, algorithm name) is unusable.
    InvalidParameter,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidGraphInput => write!(f, "invalid graph input"),
            ErrorKind::AlgorithmFailure => write!(f, "algorithm failure"),
            ErrorKind::InvalidParameter => write!(f, "invalid parameter"),
        }
    }
}

/// Errors returned by detection, coarsening and metric primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input graph has no nodes.
    EmptyInput,

    /// Partition does not cover the graph it is paired with.
    PartitionMismatch {
        /// Number of nodes in the graph.
        expected: usize,
        /// Number of nodes the partition describes.
        found: usize,
    },

    /// Algorithm did not converge within its iteration limit.
    ConvergenceFailure {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Algorithm failed for a reason of its own.
    AlgorithmFailure {
        /// Stable name of the failing algorithm.
        algorithm: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// No algorithm is registered under this name.
    UnknownAlgorithm(String),

    /// Configuration text could not be parsed.
    InvalidConfig(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput | Error::PartitionMismatch { .. } => ErrorKind::InvalidGraphInput,
            Error::ConvergenceFailure { .. } | Error::AlgorithmFailure { .. } => {
                ErrorKind::AlgorithmFailure
            }
            Error::InvalidParameter { .. }
            | Error::UnknownAlgorithm(_)
            | Error::InvalidConfig(_) => {
                ErrorKind::InvalidParameter
            }
        }
    }

    pub(crate) fn algorithm(algorithm: &str, reason: impl Into<String>) -> Self {
        Error::AlgorithmFailure {
            algorithm: algorithm.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::PartitionMismatch { expected, found } => {
                write!(
                    f,
                    "partition describes {found} nodes but the graph has {expected}"
                )
            }
            Error::ConvergenceFailure { iterations } => {
                write!(f, "did not converge after {iterations} iterations")
            }
            Error::AlgorithmFailure { algorithm, reason } => {
                write!(f, "{algorithm} failed: {reason}")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::UnknownAlgorithm(name) => write!(f, "unknown algorithm '{name}'"),
            Error::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
