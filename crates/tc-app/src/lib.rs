//! Shared application service layer for thermocalc.
//!
//! This crate wires the record source, the filtered-record cache and the
//! calculation crates into query services used by the CLI: reaction tables,
//! single-compound tables and range resolution.

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod store;

// Re-export key types for convenience
pub use cache::{CacheKey, FilteredRecordCache, MemoryCache, NoCache, policy_fingerprint};
pub use config::{EngineConfig, load_config};
pub use error::{AppError, AppResult};
pub use query::{
    CompoundReport, CompoundSummary, Engine, QueryCompound, RangeReport, ReactionQuery,
    ReactionReport, Role, load_query,
};
pub use store::JsonRecordStore;
