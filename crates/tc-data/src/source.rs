//! Retrieval collaborator interface.

use crate::phase::Phase;
use crate::record::CompoundRecordSet;
use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

/// Failure reported by a retrieval backend. "No records" is not an error:
/// backends return an empty [`CompoundRecordSet`] for that.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Record source unavailable: {message}")]
    Unavailable { message: String },

    #[error("Record search for {formula} failed: {message}")]
    Backend { formula: String, message: String },
}

impl SourceError {
    pub fn backend(formula: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::Backend {
            formula: formula.into(),
            message: message.into(),
        }
    }
}

/// Backend that returns raw candidate records for a formula.
///
/// Implementations must be thread-safe (Send + Sync): the query service
/// searches every compound of a reaction in parallel. The core always asks
/// for the full record set of a formula and never passes a temperature
/// window, so range resolution sees everything the store has.
pub trait RecordSource: Send + Sync {
    /// Source name (for logging).
    fn name(&self) -> &str;

    fn search(
        &self,
        formula: &str,
        phase: Option<Phase>,
        max_records: usize,
    ) -> SourceResult<CompoundRecordSet>;
}
