use crate::{TcError, TcResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Standard reference (anchor) temperature [K].
pub const ANCHOR_TEMPERATURE_K: Real = 298.15;

/// Records starting this close to the anchor [K] are taken as stated at their
/// own lower bound (databases list 298 K for 298.15 K).
pub const ANCHOR_MATCH_TOL_K: Real = 0.5;

/// Molar gas constant [J/(mol·K)].
pub const GAS_CONSTANT_J_PER_MOL_K: Real = 8.314_462_618;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Tolerance for comparing temperatures on segment boundaries and grids.
    ///
    /// Temperatures are O(100..10_000) K, so a nano-kelvin absolute band is
    /// well below any value that appears in a database record.
    pub const fn temperature() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-12,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Temperature equality under [`Tolerances::temperature`].
#[inline]
pub fn same_temperature(a_k: Real, b_k: Real) -> bool {
    nearly_equal(a_k, b_k, Tolerances::temperature())
}

pub fn ensure_finite(v: Real, what: &'static str) -> TcResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TcError::NonFinite { what, value: v })
    }
}
