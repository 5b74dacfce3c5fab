//! Point property evaluation on a single segment.

use crate::error::{PhaseError, PhaseResult};
use crate::segment::{PhaseSegment, ReferenceState, SegmentData};
use serde::{Deserialize, Serialize};
use tc_core::units::{self, MolarEnergy, MolarEntropy, MolarHeatCapacity, Temperature};
use tc_data::Record;

/// Cp, H and S of one compound at one temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermoPoint {
    pub t_k: f64,
    pub cp_j_per_mol_k: f64,
    pub h_j_per_mol: f64,
    pub s_j_per_mol_k: f64,
}

impl ThermoPoint {
    /// G = H − T·S.
    pub fn g_j_per_mol(&self) -> f64 {
        self.h_j_per_mol - self.t_k * self.s_j_per_mol_k
    }

    pub fn temperature(&self) -> Temperature {
        units::k(self.t_k)
    }

    pub fn heat_capacity(&self) -> MolarHeatCapacity {
        units::j_per_mol_k(self.cp_j_per_mol_k)
    }

    pub fn enthalpy(&self) -> MolarEnergy {
        units::j_per_mol(self.h_j_per_mol)
    }

    pub fn entropy(&self) -> MolarEntropy {
        units::j_per_mol_k(self.s_j_per_mol_k)
    }

    pub fn gibbs(&self) -> MolarEnergy {
        units::j_per_mol(self.g_j_per_mol())
    }
}

/// Integrate `record`'s correlation from `reference` to `t_k`.
pub(crate) fn integrate(record: &Record, reference: &ReferenceState, t_k: f64) -> ThermoPoint {
    ThermoPoint {
        t_k,
        cp_j_per_mol_k: record.cp.cp(t_k),
        h_j_per_mol: reference.h_j_per_mol + record.cp.enthalpy_integral(reference.t_k, t_k),
        s_j_per_mol_k: reference.s_j_per_mol_k + record.cp.entropy_integral(reference.t_k, t_k),
    }
}

/// Evaluate Cp, H and S at `t_k` on `segment`.
///
/// Uses only the segment's own correlation and reference state; any latent
/// heat crossed on the way is already folded into a chained reference.
///
/// # Errors
///
/// - [`PhaseError::OutOfSegmentRange`] when `t_k` is outside the segment
/// - [`PhaseError::MissingData`] on a no-data segment
pub fn evaluate(segment: &PhaseSegment, t_k: f64) -> PhaseResult<ThermoPoint> {
    if !segment.contains(t_k) {
        return Err(PhaseError::OutOfSegmentRange {
            t_k,
            lo_k: segment.lo_k,
            hi_k: segment.hi_k,
        });
    }
    match &segment.data {
        SegmentData::Record {
            record, reference, ..
        } => Ok(integrate(record, reference, t_k)),
        SegmentData::NoData => Err(PhaseError::MissingData {
            lo_k: segment.lo_k,
            hi_k: segment.hi_k,
        }),
    }
}
