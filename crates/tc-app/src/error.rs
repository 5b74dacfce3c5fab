//! Error types for the tc-app service layer.

use std::path::PathBuf;
use tc_data::DataError;
use tc_phase::PhaseError;
use tc_reaction::ReactionError;

/// Application error type wrapping the calculation crates' errors plus
/// file and parse failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to serialize report: {0}")]
    Report(String),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Reaction(#[from] ReactionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tc-app operations.
pub type AppResult<T> = Result<T, AppError>;

pub(crate) fn read_file(path: &std::path::Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
