//! tc-core: stable foundation for thermocalc.
//!
//! Contains:
//! - units (uom SI molar types + constructors)
//! - numeric (Real + tolerances + float helpers + reference constants)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TcError, TcResult};
pub use numeric::*;
pub use units::*;
