//! Reaction calculation errors.

use tc_phase::PhaseError;
use thiserror::Error;

pub type ReactionResult<T> = Result<T, ReactionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReactionError {
    #[error("Invalid reaction: {message}")]
    InvalidSpec { message: String },

    #[error("Temperature step {step_k} K is outside [{min_k}, {max_k}] K")]
    InvalidStep { step_k: f64, min_k: f64, max_k: f64 },

    #[error("No phase data for compound {formula}")]
    UnknownCompound { formula: String },

    /// Evaluation failed on a segment the calculator selected itself.
    #[error("Internal evaluation error for {formula} at {t_k} K: {source}")]
    Contract {
        formula: String,
        t_k: f64,
        #[source]
        source: PhaseError,
    },

    #[error("Temperature grid over [{lo_k}, {hi_k}] K at {step_k} K steps needs {points} points (max {max_points})")]
    GridTooLarge {
        lo_k: f64,
        hi_k: f64,
        step_k: f64,
        points: f64,
        max_points: usize,
    },
}

impl ReactionError {
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        ReactionError::InvalidSpec {
            message: message.into(),
        }
    }
}
