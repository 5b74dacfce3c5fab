//! Calculation range resolution.
//!
//! Each compound's coverage is the union of its record intervals, kept as
//! contiguous pieces so gaps stay visible. The calculation range is the
//! intersection of the pieces that contain the 298.15 K anchor when every
//! compound has one, otherwise the intersection of overall extents.

use crate::error::{PhaseError, PhaseResult};
use crate::segment::CompoundPhases;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tc_core::{ANCHOR_TEMPERATURE_K, same_temperature};
use tc_data::Record;

/// Closed temperature interval [lo, hi] in kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub lo_k: f64,
    pub hi_k: f64,
}

impl Span {
    /// Checked constructor: finite bounds with lo < hi.
    pub fn new(lo_k: f64, hi_k: f64) -> PhaseResult<Self> {
        tc_core::ensure_finite(lo_k, "span lower bound")?;
        tc_core::ensure_finite(hi_k, "span upper bound")?;
        if lo_k >= hi_k || same_temperature(lo_k, hi_k) {
            return Err(PhaseError::InvalidArg {
                what: "span lower bound must be below upper bound",
            });
        }
        Ok(Self { lo_k, hi_k })
    }

    pub fn width_k(&self) -> f64 {
        self.hi_k - self.lo_k
    }

    /// Inclusive containment with boundary tolerance.
    pub fn contains(&self, t_k: f64) -> bool {
        (self.lo_k <= t_k || same_temperature(self.lo_k, t_k))
            && (t_k <= self.hi_k || same_temperature(t_k, self.hi_k))
    }

    /// Strictly inside (boundaries excluded).
    pub fn contains_interior(&self, t_k: f64) -> bool {
        self.contains(t_k) && !same_temperature(t_k, self.lo_k) && !same_temperature(t_k, self.hi_k)
    }

    /// Non-degenerate intersection.
    pub fn intersect(&self, other: &Span) -> Option<Span> {
        let lo = self.lo_k.max(other.lo_k);
        let hi = self.hi_k.min(other.hi_k);
        (lo < hi && !same_temperature(lo, hi)).then_some(Span { lo_k: lo, hi_k: hi })
    }

    /// True if `self` lies inside `outer` (boundary tolerance applies).
    pub fn within(&self, outer: &Span) -> bool {
        outer.contains(self.lo_k) && outer.contains(self.hi_k)
    }
}

/// Union of record intervals as sorted, contiguous, non-touching pieces.
pub fn coverage_spans(records: &[Record]) -> Vec<Span> {
    let mut intervals: Vec<Span> = records
        .iter()
        .filter(|r| r.t_min_k.is_finite() && r.t_max_k.is_finite() && r.t_min_k < r.t_max_k)
        .map(|r| Span {
            lo_k: r.t_min_k,
            hi_k: r.t_max_k,
        })
        .collect();
    intervals.sort_by(|a, b| a.lo_k.total_cmp(&b.lo_k));

    let mut merged: Vec<Span> = Vec::with_capacity(intervals.len());
    for span in intervals {
        match merged.last_mut() {
            Some(last) if span.lo_k <= last.hi_k || same_temperature(span.lo_k, last.hi_k) => {
                last.hi_k = last.hi_k.max(span.hi_k);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Coverage of one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundCoverage {
    pub formula: String,
    pub spans: Vec<Span>,
}

impl CompoundCoverage {
    pub fn from_records(formula: impl Into<String>, records: &[Record]) -> Self {
        Self {
            formula: formula.into(),
            spans: coverage_spans(records),
        }
    }

    pub fn has_gaps(&self) -> bool {
        self.spans.len() > 1
    }

    /// Overall extent, bridging gaps.
    pub fn overall(&self) -> Option<Span> {
        let first = self.spans.first()?;
        let last = self.spans.last()?;
        Some(Span {
            lo_k: first.lo_k,
            hi_k: last.hi_k,
        })
    }

    /// The contiguous piece containing `t_k`.
    pub fn span_containing(&self, t_k: f64) -> Option<Span> {
        self.spans.iter().copied().find(|s| s.contains(t_k))
    }

    /// Uncovered stretches of `range`.
    pub fn gaps_within(&self, range: &Span) -> Vec<Span> {
        let mut gaps = Vec::new();
        let mut cursor = range.lo_k;
        for span in &self.spans {
            if span.hi_k <= cursor {
                continue;
            }
            if span.lo_k >= range.hi_k {
                break;
            }
            if span.lo_k > cursor && !same_temperature(span.lo_k, cursor) {
                gaps.push(Span {
                    lo_k: cursor,
                    hi_k: span.lo_k.min(range.hi_k),
                });
            }
            cursor = cursor.max(span.hi_k);
        }
        if cursor < range.hi_k && !same_temperature(cursor, range.hi_k) {
            gaps.push(Span {
                lo_k: cursor,
                hi_k: range.hi_k,
            });
        }
        gaps
    }
}

/// Whether the resolved range includes the anchor temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    Anchored,
    /// Some compound has no data reaching 298.15 K; the range was not widened.
    AnchorUnavailable,
}

/// Result of [`determine_calculation_range`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub span: Span,
    pub anchor: AnchorStatus,
    /// Per-compound coverage pieces, in formula order.
    pub coverage: Vec<CompoundCoverage>,
}

impl ResolvedRange {
    pub fn is_anchored(&self) -> bool {
        self.anchor == AnchorStatus::Anchored
    }

    /// Compounds whose record coverage leaves gaps inside the resolved span.
    pub fn compounds_with_gaps(&self) -> Vec<&str> {
        self.coverage
            .iter()
            .filter(|c| !c.gaps_within(&self.span).is_empty())
            .map(|c| c.formula.as_str())
            .collect()
    }
}

/// Determine the temperature range over which every compound has data.
pub fn determine_calculation_range(
    compound_to_records: &BTreeMap<String, Vec<Record>>,
) -> PhaseResult<ResolvedRange> {
    if compound_to_records.is_empty() {
        return Err(PhaseError::InvalidArg {
            what: "no compounds to resolve a range for",
        });
    }

    let coverage: Vec<CompoundCoverage> = compound_to_records
        .iter()
        .map(|(formula, records)| CompoundCoverage::from_records(formula.clone(), records))
        .collect();

    if let Some(empty) = coverage.iter().find(|c| c.spans.is_empty()) {
        return Err(PhaseError::RangeUnresolvable {
            compounds: vec![empty.formula.clone()],
            lo_k: f64::NAN,
            hi_k: f64::NAN,
        });
    }

    // Anchored: every compound has a contiguous piece through 298.15 K.
    let anchored: Option<Vec<Span>> = coverage
        .iter()
        .map(|c| c.span_containing(ANCHOR_TEMPERATURE_K))
        .collect();
    if let Some(pieces) = anchored {
        let span = pieces
            .iter()
            .skip(1)
            .try_fold(pieces[0], |acc, s| acc.intersect(s));
        if let Some(span) = span {
            tracing::debug!(lo_k = span.lo_k, hi_k = span.hi_k, "anchored calculation range");
            return Ok(ResolvedRange {
                span,
                anchor: AnchorStatus::Anchored,
                coverage,
            });
        }
    }

    // Fallback: intersection of overall extents, no anchor requirement.
    let extents: Vec<(&str, Span)> = coverage
        .iter()
        .filter_map(|c| c.overall().map(|s| (c.formula.as_str(), s)))
        .collect();
    let lo = extents
        .iter()
        .map(|(_, s)| s.lo_k)
        .fold(f64::NEG_INFINITY, f64::max);
    let hi = extents
        .iter()
        .map(|(_, s)| s.hi_k)
        .fold(f64::INFINITY, f64::min);

    if lo >= hi || same_temperature(lo, hi) {
        let mut compounds: Vec<String> = extents
            .iter()
            .filter(|(_, s)| s.lo_k == lo || s.hi_k == hi)
            .map(|(f, _)| f.to_string())
            .collect();
        compounds.dedup();
        return Err(PhaseError::RangeUnresolvable {
            compounds,
            lo_k: lo,
            hi_k: hi,
        });
    }

    let span = Span { lo_k: lo, hi_k: hi };
    tracing::warn!(
        lo_k = lo,
        hi_k = hi,
        "anchor temperature unavailable for every compound; range not widened"
    );
    Ok(ResolvedRange {
        span,
        anchor: AnchorStatus::AnchorUnavailable,
        coverage,
    })
}

/// Post-condition check on built segments: true iff the compound's segments
/// cover `range` with no no-data sentinel inside it.
pub fn validate_range_coverage(
    compounds: &BTreeMap<String, CompoundPhases>,
    range: Span,
) -> BTreeMap<String, bool> {
    compounds
        .iter()
        .map(|(formula, phases)| (formula.clone(), phases.covers(&range)))
        .collect()
}

/// Requested vs. resolved range plus per-compound coverage validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRange {
    /// Range the user asked for; display and comparison only.
    pub requested: Option<Span>,
    pub resolved: Span,
    pub anchor: AnchorStatus,
    pub coverage: BTreeMap<String, bool>,
}

impl CalculationRange {
    pub fn new(
        requested: Option<Span>,
        resolved: &ResolvedRange,
        coverage: BTreeMap<String, bool>,
    ) -> Self {
        Self {
            requested,
            resolved: resolved.span,
            anchor: resolved.anchor,
            coverage,
        }
    }

    pub fn is_fully_covered(&self) -> bool {
        self.coverage.values().all(|ok| *ok)
    }

    /// Whether the requested window extends beyond what can be calculated.
    pub fn request_exceeds_resolved(&self) -> bool {
        self.requested
            .is_some_and(|req| !req.within(&self.resolved))
    }
}
