//! tc-data: thermodynamic database records for thermocalc.
//!
//! Provides:
//! - Phase tags (closed variant including the no-data sentinel)
//! - Heat-capacity correlations with closed-form integrals
//! - Record and CompoundRecordSet definitions
//! - RecordFilter (validity, de-duplication, species-form policy, fallback)
//! - RecordSource trait isolating the retrieval backend
//!
//! # Architecture
//!
//! Everything downstream (range resolution, segment building, reaction
//! calculation) consumes `Record`s that went through [`filter_records`].
//! The retrieval backend is hidden behind [`RecordSource`], so a database,
//! a JSON file or an in-memory fixture can feed the same pipeline.
//!
//! # Example
//!
//! ```
//! use tc_data::{CompoundRecordSet, CpCorrelation, FilterPolicy, Phase, Record, filter_records};
//!
//! let feo = Record::new("FeO", Phase::Solid, 298.0, 600.0)
//!     .with_reference(-265_053.0, 60.75)
//!     .with_cp(CpCorrelation::Constant { cp: 49.9 });
//! let set = CompoundRecordSet::new("FeO", vec![feo]);
//!
//! let filtered = filter_records(&set, &FilterPolicy::default()).unwrap();
//! assert_eq!(filtered.records.len(), 1);
//! ```

pub mod correlation;
pub mod error;
pub mod filter;
pub mod phase;
pub mod record;
pub mod source;

// Re-exports for ergonomics
pub use correlation::CpCorrelation;
pub use error::{DataError, DataResult, InvalidReason};
pub use filter::{Confidence, FilterPolicy, FilterReport, FilteredRecords, filter_records};
pub use phase::Phase;
pub use record::{CompoundRecordSet, Record, TransitionData, compare_priority};
pub use source::{RecordSource, SourceError, SourceResult};
