//! Record filtering for one compound.
//!
//! The filter is a pure function of the record set and the policy:
//! 1. drop structurally invalid records,
//! 2. collapse near-identical duplicates,
//! 3. apply species-form and reliability policy,
//! 4. if nothing survives, re-admit the best few records as a low-confidence set.
//!
//! Survivors keep their original relative order; later stages use that order
//! as the final tie-break.

use crate::error::{DataError, DataResult};
use crate::record::{CompoundRecordSet, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Caller-controlled filtering policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPolicy {
    /// Keep ionic/aqueous species forms.
    pub include_ionic: bool,
    /// Strict cut: drop records whose class is worse than this.
    pub max_reliability_class: Option<u8>,
    /// How many records the fallback re-admits.
    pub fallback_top_k: usize,
    /// Interval ends closer than this [K] count as the same interval.
    pub duplicate_tolerance_k: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            include_ionic: false,
            max_reliability_class: None,
            fallback_top_k: 3,
            duplicate_tolerance_k: 1.0,
        }
    }
}

/// Whether the surviving records passed strict filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Normal,
    /// Produced by the fallback; downstream reports should say so.
    Low,
}

/// Drop counts per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub candidates: usize,
    pub invalid: usize,
    pub duplicates: usize,
    pub excluded_forms: usize,
    pub above_reliability_cut: usize,
    pub fallback_admitted: usize,
}

/// Output of [`filter_records`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRecords {
    pub formula: String,
    pub records: Vec<Record>,
    pub confidence: Confidence,
    pub report: FilterReport,
}

impl FilteredRecords {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }

    /// Re-wrap the survivors as a record set (e.g. to feed a second pass).
    pub fn to_record_set(&self) -> CompoundRecordSet {
        CompoundRecordSet::new(self.formula.clone(), self.records.clone())
    }
}

/// Ranking used inside the filter: class, then narrower, then earlier input.
fn filter_rank(a: &(usize, &Record), b: &(usize, &Record)) -> Ordering {
    a.1.reliability_class
        .cmp(&b.1.reliability_class)
        .then_with(|| a.1.width_k().total_cmp(&b.1.width_k()))
        .then_with(|| a.0.cmp(&b.0))
}

fn is_duplicate(a: &Record, b: &Record, tol_k: f64) -> bool {
    a.phase == b.phase
        && (a.t_min_k - b.t_min_k).abs() <= tol_k
        && (a.t_max_k - b.t_max_k).abs() <= tol_k
}

/// Filter the raw record set of one compound.
pub fn filter_records(
    set: &CompoundRecordSet,
    policy: &FilterPolicy,
) -> DataResult<FilteredRecords> {
    let formula = set.formula.trim();
    let mut report = FilterReport {
        candidates: set.len(),
        ..FilterReport::default()
    };

    let mut valid: Vec<(usize, &Record)> = Vec::with_capacity(set.len());
    for (pos, record) in set.iter().enumerate() {
        let checked = if record.formula.trim() != formula {
            Err(crate::error::InvalidReason::FormulaMismatch)
        } else {
            record.validate()
        };
        match checked {
            Ok(()) => valid.push((pos, record)),
            Err(reason) => {
                tracing::debug!(formula, source = %record.source, %reason, "dropping invalid record");
                report.invalid += 1;
            }
        }
    }

    // Greedy over the best-first ranking: a record survives unless an
    // already-kept record duplicates it, so survivors are pairwise distinct.
    let mut ranked = valid;
    ranked.sort_by(filter_rank);
    let mut distinct: Vec<(usize, &Record)> = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        let duplicated = distinct
            .iter()
            .any(|(_, kept)| is_duplicate(kept, candidate.1, policy.duplicate_tolerance_k));
        if duplicated {
            report.duplicates += 1;
        } else {
            distinct.push(candidate);
        }
    }

    let mut strict: Vec<(usize, &Record)> = Vec::with_capacity(distinct.len());
    for &(pos, record) in &distinct {
        if !policy.include_ionic && record.is_ionic_form() {
            report.excluded_forms += 1;
        } else if policy
            .max_reliability_class
            .is_some_and(|max| record.reliability_class > max)
        {
            report.above_reliability_cut += 1;
        } else {
            strict.push((pos, record));
        }
    }

    let (mut survivors, confidence) = if !strict.is_empty() {
        (strict, Confidence::Normal)
    } else if distinct.is_empty() {
        return Err(DataError::NoUsableRecords {
            formula: formula.to_string(),
            candidates: set.len(),
        });
    } else {
        // `distinct` is still in best-first order here.
        let admitted: Vec<(usize, &Record)> =
            distinct.into_iter().take(policy.fallback_top_k.max(1)).collect();
        report.fallback_admitted = admitted.len();
        tracing::warn!(
            formula,
            admitted = admitted.len(),
            candidates = set.len(),
            "strict filtering removed every record; using low-confidence fallback"
        );
        (admitted, Confidence::Low)
    };

    survivors.sort_by_key(|(pos, _)| *pos);

    Ok(FilteredRecords {
        formula: formula.to_string(),
        records: survivors.into_iter().map(|(_, r)| r.clone()).collect(),
        confidence,
        report,
    })
}
