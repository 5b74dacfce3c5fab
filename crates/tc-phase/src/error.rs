//! Range resolution and evaluation errors.

use tc_core::TcError;
use thiserror::Error;

/// Result type for phase operations.
pub type PhaseResult<T> = Result<T, PhaseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhaseError {
    /// The compounds share no temperature interval; terminal for the query.
    #[error(
        "No common calculation range: coverage of {} does not overlap (best candidate [{lo_k}, {hi_k}] K is empty)",
        .compounds.join(", ")
    )]
    RangeUnresolvable {
        compounds: Vec<String>,
        lo_k: f64,
        hi_k: f64,
    },

    /// Evaluator called outside the segment it was handed (caller bug).
    #[error("Temperature {t_k} K is outside segment [{lo_k}, {hi_k}] K")]
    OutOfSegmentRange { t_k: f64, lo_k: f64, hi_k: f64 },

    /// Evaluator called on a no-data sentinel segment (caller bug).
    #[error("No data for segment [{lo_k}, {hi_k}] K")]
    MissingData { lo_k: f64, hi_k: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Core(#[from] TcError),
}

impl PhaseError {
    /// Contract violations are programming errors, never user-facing data problems.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PhaseError::OutOfSegmentRange { .. } | PhaseError::MissingData { .. }
        )
    }
}
