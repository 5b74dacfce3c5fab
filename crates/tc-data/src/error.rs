//! Record and retrieval errors.

use crate::source::SourceError;
use thiserror::Error;

/// Result type for record operations.
pub type DataResult<T> = Result<T, DataError>;

/// Why a single record was rejected by the filter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvalidReason {
    #[error("reference enthalpy or entropy missing or non-finite")]
    NonFiniteReference,

    #[error("applicability interval is empty or non-finite")]
    EmptyInterval,

    #[error("applicability interval starts at or below 0 K")]
    NonPositiveTemperature,

    #[error("heat-capacity coefficients are non-finite")]
    NonFiniteCorrelation,

    #[error("transition metadata is non-finite")]
    NonFiniteTransition,

    #[error("records cannot carry the no-data phase tag")]
    NoDataPhase,

    #[error("record formula does not match the requested compound")]
    FormulaMismatch,
}

/// Errors that can occur while preparing records for a compound.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Malformed record surfaced to the caller (the filter normally drops these).
    #[error("Invalid record for {formula} from {source_id}: {reason}")]
    InvalidRecord {
        formula: String,
        source_id: String,
        reason: InvalidReason,
    },

    /// Strict filtering and the fallback both came up empty.
    #[error("No usable records for {formula} ({candidates} candidates, none structurally valid)")]
    NoUsableRecords { formula: String, candidates: usize },

    /// Retrieval collaborator failure, propagated unmodified.
    #[error(transparent)]
    Source(#[from] SourceError),
}
