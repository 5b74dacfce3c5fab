//! tc-phase: per-compound phase reconciliation for thermocalc.
//!
//! Provides:
//! - Range resolution across compounds with fragmented coverage
//! - Segment building (record selection, no-data gaps, transitions)
//! - Point property evaluation on a single segment
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use tc_data::{CpCorrelation, Phase, Record};
//! use tc_phase::{build_segments, determine_calculation_range, evaluate};
//!
//! let records = vec![
//!     Record::new("FeO", Phase::Solid, 298.0, 600.0)
//!         .with_reference(-265_053.0, 60.75)
//!         .with_cp(CpCorrelation::Constant { cp: 49.9 }),
//! ];
//! let mut by_compound = BTreeMap::new();
//! by_compound.insert("FeO".to_string(), records.clone());
//!
//! let range = determine_calculation_range(&by_compound).unwrap();
//! let phases = build_segments("FeO", &records, range.span).unwrap();
//! let seg = phases.segment_at(298.0).unwrap();
//! let point = evaluate(seg, 298.0).unwrap();
//! assert_eq!(point.h_j_per_mol, -265_053.0);
//! ```

pub mod error;
pub mod evaluate;
pub mod range;
pub mod segment;

// Re-exports for ergonomics
pub use error::{PhaseError, PhaseResult};
pub use evaluate::{ThermoPoint, evaluate};
pub use range::{
    AnchorStatus, CalculationRange, CompoundCoverage, ResolvedRange, Span, coverage_spans,
    determine_calculation_range, validate_range_coverage,
};
pub use segment::{
    CompoundPhases, Coverage, PhaseSegment, PhaseTransition, ReferenceOrigin, ReferenceState,
    SegmentData, TRANSITION_MATCH_TOL_K, TransitionQuality, build_segments,
};
