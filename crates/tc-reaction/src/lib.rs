//! tc-reaction: reaction and compound property tables for thermocalc.
//!
//! Provides:
//! - ReactionSpec (signed stoichiometry, tabulation step)
//! - Temperature grid with transition temperatures inserted exactly
//! - ReactionCalculator (ΔH, ΔS, ΔG, ln K per grid temperature)
//! - Single-compound property tables
//!
//! Aggregation is deterministic: compounds are keyed in a `BTreeMap` and
//! participants are summed in the order the reaction lists them.

pub mod calculator;
pub mod error;
pub mod grid;
pub mod spec;
pub mod table;

// Re-exports for ergonomics
pub use calculator::{ActivePhase, ReactionCalculationRow, RowQuality, TransitionNote, calculate};
pub use error::{ReactionError, ReactionResult};
pub use grid::{MAX_GRID_POINTS, temperature_grid};
pub use spec::{MAX_STEP_K, MIN_STEP_K, Participant, ReactionSpec, validate_step};
pub use table::{CompoundTableRow, compound_table};
