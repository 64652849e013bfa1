//! Error types for the simulation pipeline.
//!
//! Configuration problems are reported before any run starts; sampling and
//! aggregation problems carry enough context (run index, parameter name) to
//! point at the offending run.

use thiserror::Error;

/// A problem found while validating a [`ScenarioConfig`](crate::config::ScenarioConfig).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field} — {message}")]
pub struct ConfigError {
    /// Dotted path of the offending field, e.g. `economy.fossil_cost`.
    pub field: String,
    /// Human-readable description of the constraint that failed.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A failure while drawing the per-run Monte Carlo parameter sample or the
/// agent attributes derived from it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// Every draw fell outside the parameter's hard physical bound.
    #[error(
        "parameter \"{parameter}\" stayed outside [{lo}, {hi}] after {attempts} draws in run {run}"
    )]
    OutOfBounds {
        parameter: &'static str,
        run: usize,
        lo: f64,
        hi: f64,
        attempts: u32,
    },
    /// Shape parameters do not define a valid distribution.
    #[error("parameter \"{parameter}\" does not define a valid distribution in run {run}: {reason}")]
    InvalidDistribution {
        parameter: &'static str,
        run: usize,
        reason: String,
    },
}

/// A failure while reducing a completed ensemble to summary statistics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// No runs to aggregate.
    #[error("cannot aggregate an empty ensemble")]
    EmptyEnsemble,
    /// Confidence bands need at least two runs.
    #[error("cannot aggregate a single-run ensemble; confidence bands need at least 2 runs")]
    SingleRun,
    /// A run holds a different number of yearly snapshots than the first run.
    #[error("run {run} holds {found} yearly snapshots, expected {expected}")]
    LengthMismatch {
        run: usize,
        expected: usize,
        found: usize,
    },
    /// A run's year sequence deviates from the first run's.
    #[error("run {run} deviates from the ensemble year sequence at position {position}: expected year {expected}, found {found}")]
    YearMismatch {
        run: usize,
        position: usize,
        expected: u16,
        found: u16,
    },
}

/// Umbrella error for the full configure-sample-simulate-aggregate pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    /// The batch was aborted before every requested run finished. Completed
    /// runs are discarded; a partial ensemble is never aggregated.
    #[error("batch cancelled after {completed} of {requested} runs")]
    Cancelled { completed: usize, requested: usize },
}
