//! Database records.

use crate::correlation::CpCorrelation;
use crate::error::InvalidReason;
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tc_core::{ANCHOR_MATCH_TOL_K, ANCHOR_TEMPERATURE_K};

fn missing_value() -> f64 {
    f64::NAN
}

fn default_reliability_class() -> u8 {
    1
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Latent heat a record declares for one of its phase boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionData {
    pub temperature_k: f64,
    pub enthalpy_j_per_mol: f64,
    /// Stored ΔS; derived as ΔH/T when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy_j_per_mol_k: Option<f64>,
}

impl TransitionData {
    pub fn entropy(&self) -> f64 {
        self.entropy_j_per_mol_k
            .unwrap_or(self.enthalpy_j_per_mol / self.temperature_k)
    }

    fn is_finite(&self) -> bool {
        self.temperature_k.is_finite()
            && self.temperature_k > 0.0
            && self.enthalpy_j_per_mol.is_finite()
            && self.entropy_j_per_mol_k.is_none_or(f64::is_finite)
    }
}

/// One database entry for one compound in one phase.
///
/// Missing reference values deserialize to NaN so the filter can reject them
/// instead of failing the whole record set at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub formula: String,
    pub phase: Phase,
    pub t_min_k: f64,
    pub t_max_k: f64,
    #[serde(default = "missing_value")]
    pub h_ref_j_per_mol: f64,
    #[serde(default = "missing_value")]
    pub s_ref_j_per_mol_k: f64,
    /// Temperature the reference values are stated at, when the database says so.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ref_k: Option<f64>,
    pub cp: CpCorrelation,
    #[serde(default = "default_reliability_class")]
    pub reliability_class: u8,
    #[serde(default)]
    pub source: String,
    /// Reference values are filler (e.g. H_ref = 0 for a high-temperature phase).
    #[serde(default, skip_serializing_if = "is_false")]
    pub placeholder_reference: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionData>,
}

impl Record {
    /// Start a record with zero reference values and zero heat capacity.
    pub fn new(formula: impl Into<String>, phase: Phase, t_min_k: f64, t_max_k: f64) -> Self {
        Self {
            formula: formula.into(),
            phase,
            t_min_k,
            t_max_k,
            h_ref_j_per_mol: 0.0,
            s_ref_j_per_mol_k: 0.0,
            t_ref_k: None,
            cp: CpCorrelation::Constant { cp: 0.0 },
            reliability_class: default_reliability_class(),
            source: String::new(),
            placeholder_reference: false,
            transitions: Vec::new(),
        }
    }

    pub fn with_reference(mut self, h_j_per_mol: f64, s_j_per_mol_k: f64) -> Self {
        self.h_ref_j_per_mol = h_j_per_mol;
        self.s_ref_j_per_mol_k = s_j_per_mol_k;
        self
    }

    pub fn with_reference_temperature(mut self, t_ref_k: f64) -> Self {
        self.t_ref_k = Some(t_ref_k);
        self
    }

    pub fn with_cp(mut self, cp: CpCorrelation) -> Self {
        self.cp = cp;
        self
    }

    pub fn with_reliability(mut self, class: u8) -> Self {
        self.reliability_class = class;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_placeholder_reference(mut self) -> Self {
        self.placeholder_reference = true;
        self
    }

    pub fn with_transition(mut self, transition: TransitionData) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn width_k(&self) -> f64 {
        self.t_max_k - self.t_min_k
    }

    pub fn contains(&self, t_k: f64) -> bool {
        self.t_min_k <= t_k && t_k <= self.t_max_k
    }

    /// Point the reference values are integrated from.
    ///
    /// 298.15 K when it lies inside the interval, else the stated `t_ref_k`,
    /// else the interval start. An interval starting within
    /// [`ANCHOR_MATCH_TOL_K`] of the anchor is taken as stated at its start.
    pub fn reference_temperature_k(&self) -> f64 {
        if self.contains(ANCHOR_TEMPERATURE_K) {
            if (self.t_min_k - ANCHOR_TEMPERATURE_K).abs() <= ANCHOR_MATCH_TOL_K {
                self.t_min_k
            } else {
                ANCHOR_TEMPERATURE_K
            }
        } else {
            self.t_ref_k.unwrap_or(self.t_min_k)
        }
    }

    /// Transition metadata declared within `tol_k` of `t_k`.
    pub fn transition_near(&self, t_k: f64, tol_k: f64) -> Option<&TransitionData> {
        self.transitions
            .iter()
            .filter(|tr| (tr.temperature_k - t_k).abs() <= tol_k)
            .min_by(|a, b| {
                (a.temperature_k - t_k)
                    .abs()
                    .total_cmp(&(b.temperature_k - t_k).abs())
            })
    }

    /// Ionic or aqueous species form (phase tag or a charge in the formula).
    pub fn is_ionic_form(&self) -> bool {
        if self.phase == Phase::Ionic {
            return true;
        }
        let formula = self.formula.trim();
        formula.contains("(aq)")
            || formula.contains("[+") // Na[+], SO4[2-]
            || formula.contains("-]")
            || formula
                .char_indices()
                .skip(1)
                .any(|(_, c)| c == '+' || c == '-')
    }

    /// Structural validity; says nothing about policy (ionic forms, reliability cut).
    pub fn validate(&self) -> Result<(), InvalidReason> {
        if self.phase == Phase::NoData {
            return Err(InvalidReason::NoDataPhase);
        }
        if !self.h_ref_j_per_mol.is_finite() || !self.s_ref_j_per_mol_k.is_finite() {
            return Err(InvalidReason::NonFiniteReference);
        }
        if self.t_ref_k.is_some_and(|t| !t.is_finite() || t <= 0.0) {
            return Err(InvalidReason::NonFiniteReference);
        }
        if !self.t_min_k.is_finite() || !self.t_max_k.is_finite() || self.t_min_k >= self.t_max_k
        {
            return Err(InvalidReason::EmptyInterval);
        }
        if self.t_min_k <= 0.0 {
            return Err(InvalidReason::NonPositiveTemperature);
        }
        if !self.cp.is_finite() {
            return Err(InvalidReason::NonFiniteCorrelation);
        }
        if !self.transitions.iter().all(TransitionData::is_finite) {
            return Err(InvalidReason::NonFiniteTransition);
        }
        Ok(())
    }
}

/// Selection order between two overlapping records; `Less` means `a` wins.
///
/// Lower reliability class first, then the narrower interval, then the
/// later-listed record (`a_pos`/`b_pos` are input positions).
pub fn compare_priority(a: &Record, a_pos: usize, b: &Record, b_pos: usize) -> Ordering {
    a.reliability_class
        .cmp(&b.reliability_class)
        .then_with(|| a.width_k().total_cmp(&b.width_k()))
        .then_with(|| b_pos.cmp(&a_pos))
}

/// Raw records for one compound exactly as the retrieval collaborator returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecordSet {
    pub formula: String,
    pub records: Vec<Record>,
}

impl CompoundRecordSet {
    pub fn new(formula: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            formula: formula.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter()
    }
}
