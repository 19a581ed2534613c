//! Error types for the boreas-regression crate.

/// Error raised when the climatological statistics bundle is unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// Returned when a required statistic is absent from the bundle.
    #[error("stat {stat} not found in stats; required stats are: {required:?}")]
    MissingStat {
        /// Name of the first missing statistic.
        stat: String,
        /// The full set of required statistics, in check order.
        required: Vec<String>,
    },

    /// Returned when a per-point field does not match the number of points.
    #[error("stat {stat} has {got} values, expected {expected} (or a single value)")]
    ShapeMismatch {
        /// Name of the statistic.
        stat: String,
        /// Number of spatial points in the forecast.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when a per-point field holds no values at all.
    #[error("stat {stat} is an empty field")]
    EmptyField {
        /// Name of the statistic.
        stat: String,
    },
}

/// Error type for all fallible operations in the boreas-regression crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CalibrationError {
    /// Wrapped statistics validation error.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Returned when the raw forecast has no members or no points.
    #[error("raw forecast is empty ({members} members x {points} points)")]
    EmptyForecast {
        /// Number of ensemble members.
        members: usize,
        /// Number of spatial points.
        points: usize,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when diagnostics cannot be serialised.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}
