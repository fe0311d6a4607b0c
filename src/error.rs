use thiserror::Error;

use crate::table::MalformedInput;

/// Failures surfaced by the grouping pipeline.
///
/// Every variant is terminal for a run: nothing is retried and nothing is
/// masked with a default value.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInput),

    /// `min_group_size` outside `1..=n_persons`, rejected before any model
    /// is built.
    #[error("min group size must be between 1 and {n_persons}, got {min_group_size}")]
    InvalidParameter {
        min_group_size: usize,
        n_persons: usize,
    },

    /// The backend proved that no assignment satisfies all constraints.
    #[error("no feasible grouping with min group size {min_group_size}; relax it and rerun")]
    Infeasible { min_group_size: usize },

    /// The backend terminated abnormally.
    #[error("solver failed: {0}")]
    Solver(String),

    /// Worst and perfect objective values coincide, so the score denominator
    /// is zero. The grouping itself is still valid, it just cannot be scored.
    #[error("score is undefined: worst and perfect objective values are both {value}")]
    DegenerateScore { value: f64 },

    /// The input file could not be read or decoded.
    #[error("failed to read input: {0}")]
    Csv(#[from] csv::Error),
}
