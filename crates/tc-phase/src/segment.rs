//! Segment building.
//!
//! Turns a compound's filtered records into ordered, non-overlapping phase
//! segments tiling the resolved range, then derives phase transitions from
//! the boundaries where the phase tag changes.
//!
//! Selection on overlaps is an explicit ordered comparator
//! ([`tc_data::compare_priority`]): reliability class, then interval width,
//! then input position (later wins). Picking the best covering record on each
//! elementary interval between record endpoints is the same as keeping the
//! active record until it ends or a strictly better one starts.

use crate::error::PhaseResult;
use crate::evaluate::integrate;
use crate::range::Span;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tc_core::same_temperature;
use tc_data::{Phase, Record, TransitionData, compare_priority};

/// Max distance [K] between a record's declared transition and a segment boundary.
pub const TRANSITION_MATCH_TOL_K: f64 = 0.5;

/// Where a segment's reference state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceOrigin {
    /// The record's own reference values.
    Record,
    /// Placeholder values replaced by the previous segment's end state plus
    /// the boundary's latent heat.
    Chained,
    /// Placeholder values with nothing to chain from. H, S and G on such a
    /// segment are not meaningful; only Cp is.
    Unanchored,
}

/// State the segment's Cp correlation is integrated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceState {
    pub t_k: f64,
    pub h_j_per_mol: f64,
    pub s_j_per_mol_k: f64,
    pub origin: ReferenceOrigin,
}

impl ReferenceState {
    pub fn from_record(record: &Record) -> Self {
        Self {
            t_k: record.reference_temperature_k(),
            h_j_per_mol: record.h_ref_j_per_mol,
            s_j_per_mol_k: record.s_ref_j_per_mol_k,
            origin: ReferenceOrigin::Record,
        }
    }
}

/// What backs a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentData {
    Record {
        record: Box<Record>,
        /// Position of the record in the builder's input.
        position: usize,
        reference: ReferenceState,
    },
    /// No record covers this stretch.
    NoData,
}

/// One stretch of a compound's temperature axis backed by a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSegment {
    pub lo_k: f64,
    pub hi_k: f64,
    pub data: SegmentData,
}

impl PhaseSegment {
    pub fn phase(&self) -> Phase {
        match &self.data {
            SegmentData::Record { record, .. } => record.phase,
            SegmentData::NoData => Phase::NoData,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match &self.data {
            SegmentData::Record { record, .. } => Some(record),
            SegmentData::NoData => None,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceState> {
        match &self.data {
            SegmentData::Record { reference, .. } => Some(reference),
            SegmentData::NoData => None,
        }
    }

    /// False for a placeholder segment that could not be chained.
    pub fn is_anchored(&self) -> bool {
        self.reference()
            .is_none_or(|r| r.origin != ReferenceOrigin::Unanchored)
    }

    pub fn span(&self) -> Span {
        Span {
            lo_k: self.lo_k,
            hi_k: self.hi_k,
        }
    }

    pub fn contains(&self, t_k: f64) -> bool {
        self.span().contains(t_k)
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.data, SegmentData::NoData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionQuality {
    /// Latent heat taken from record metadata.
    Quantified,
    /// Both adjacent records declared different values; the better record's won.
    Conflicting,
    /// No metadata; ΔH = ΔS = 0.
    Unquantified,
}

/// Change of phase between two adjacent data segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub formula: String,
    pub temperature_k: f64,
    pub from: Phase,
    pub to: Phase,
    pub enthalpy_j_per_mol: f64,
    pub entropy_j_per_mol_k: f64,
    pub quality: TransitionQuality,
}

impl PhaseTransition {
    /// Short label such as `FeO s→l @ 1650 K`.
    pub fn label(&self) -> String {
        format!(
            "{} {}→{} @ {} K",
            self.formula,
            self.from.key(),
            self.to.key(),
            self.temperature_k
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Coverage {
    Complete,
    /// Gaps or unanchored placeholder segments inside the resolved range; the
    /// calculation proceeds and flags them.
    Incomplete {
        gaps: Vec<Span>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unanchored: Vec<Span>,
    },
}

/// Built segments and transitions for one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundPhases {
    pub formula: String,
    pub range: Span,
    pub segments: Vec<PhaseSegment>,
    pub transitions: Vec<PhaseTransition>,
    pub coverage: Coverage,
}

impl CompoundPhases {
    pub fn is_complete(&self) -> bool {
        matches!(self.coverage, Coverage::Complete)
    }

    /// Segment for `t_k`; a boundary point belongs to the segment ending there.
    pub fn segment_at(&self, t_k: f64) -> Option<&PhaseSegment> {
        self.segments.iter().find(|s| s.contains(t_k))
    }

    /// Transition at `t_k` (boundary tolerance applies).
    pub fn transition_at(&self, t_k: f64) -> Option<&PhaseTransition> {
        self.transitions
            .iter()
            .find(|tr| same_temperature(tr.temperature_k, t_k))
    }

    /// True iff segments tile `range` and none inside it is a no-data sentinel.
    pub fn covers(&self, range: &Span) -> bool {
        if !range.within(&self.range) {
            return false;
        }
        !self
            .segments
            .iter()
            .any(|s| s.is_no_data() && s.span().intersect(range).is_some())
    }
}

/// Covering test with boundary tolerance.
fn covers_piece(record: &Record, lo_k: f64, hi_k: f64) -> bool {
    (record.t_min_k <= lo_k || same_temperature(record.t_min_k, lo_k))
        && (record.t_max_k >= hi_k || same_temperature(record.t_max_k, hi_k))
}

/// Build the segments of one compound over `range`.
///
/// Selection, transitions and reference chaining run over every record
/// reaching below `range.hi_k`, so a placeholder record is chained through
/// phases that end before `range.lo_k`. The result is then clipped to `range`.
pub fn build_segments(
    formula: &str,
    records: &[Record],
    range: Span,
) -> PhaseResult<CompoundPhases> {
    let range = Span::new(range.lo_k, range.hi_k)?;
    let floor_k = records
        .iter()
        .filter(|r| r.phase.has_data() && r.t_min_k < range.hi_k)
        .map(|r| r.t_min_k)
        .fold(range.lo_k, f64::min);
    let extended = Span {
        lo_k: floor_k,
        hi_k: range.hi_k,
    };

    let mut segments = select_segments(records, extended, range.lo_k);
    let transitions = detect_transitions(formula, &segments);
    chain_placeholder_references(formula, &mut segments, &transitions);

    let segments: Vec<PhaseSegment> = segments
        .into_iter()
        .filter_map(|mut segment| {
            let clipped = segment.span().intersect(&range)?;
            segment.lo_k = clipped.lo_k;
            segment.hi_k = clipped.hi_k;
            Some(segment)
        })
        .collect();
    let transitions: Vec<PhaseTransition> = transitions
        .into_iter()
        .filter(|tr| range.contains_interior(tr.temperature_k))
        .collect();

    let gaps: Vec<Span> = segments
        .iter()
        .filter(|s| s.is_no_data())
        .map(PhaseSegment::span)
        .collect();
    let unanchored: Vec<Span> = segments
        .iter()
        .filter(|s| !s.is_anchored())
        .map(PhaseSegment::span)
        .collect();
    let coverage = if gaps.is_empty() && unanchored.is_empty() {
        Coverage::Complete
    } else {
        tracing::warn!(
            formula,
            gaps = gaps.len(),
            unanchored = unanchored.len(),
            "compound has no usable data for part of the range"
        );
        Coverage::Incomplete { gaps, unanchored }
    };

    tracing::debug!(
        formula,
        segments = segments.len(),
        transitions = transitions.len(),
        "built phase segments"
    );

    Ok(CompoundPhases {
        formula: formula.to_string(),
        range,
        segments,
        transitions,
        coverage,
    })
}

/// Best record per elementary piece of `span`, adjacent pieces merged.
fn select_segments(records: &[Record], span: Span, cut_k: f64) -> Vec<PhaseSegment> {
    let candidates: Vec<(usize, &Record)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.phase.has_data())
        .filter(|(_, r)| r.t_max_k > span.lo_k && r.t_min_k < span.hi_k)
        .collect();

    let mut breakpoints: Vec<f64> = vec![span.lo_k, span.hi_k];
    if span.contains_interior(cut_k) {
        breakpoints.push(cut_k);
    }
    for (_, r) in &candidates {
        for t in [r.t_min_k, r.t_max_k] {
            if span.contains_interior(t) {
                breakpoints.push(t);
            }
        }
    }
    breakpoints.sort_by(f64::total_cmp);
    breakpoints.dedup_by(|a, b| same_temperature(*a, *b));

    // (lo, hi, winning input position) per elementary piece, merged as we go.
    let mut pieces: Vec<(f64, f64, Option<usize>)> = Vec::with_capacity(breakpoints.len());
    for window in breakpoints.windows(2) {
        let (lo, hi) = (window[0], window[1]);
        let best = candidates
            .iter()
            .filter(|(_, r)| covers_piece(r, lo, hi))
            .min_by(|(pa, ra), (pb, rb)| compare_priority(ra, *pa, rb, *pb))
            .map(|(pos, _)| *pos);
        match pieces.last_mut() {
            Some(last) if last.2 == best => last.1 = hi,
            _ => pieces.push((lo, hi, best)),
        }
    }

    pieces
        .into_iter()
        .map(|(lo_k, hi_k, best)| PhaseSegment {
            lo_k,
            hi_k,
            data: match best {
                Some(position) => {
                    let record = &records[position];
                    SegmentData::Record {
                        record: Box::new(record.clone()),
                        position,
                        reference: ReferenceState::from_record(record),
                    }
                }
                None => SegmentData::NoData,
            },
        })
        .collect()
}

fn detect_transitions(formula: &str, segments: &[PhaseSegment]) -> Vec<PhaseTransition> {
    let mut transitions = Vec::new();
    for pair in segments.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        let (
            SegmentData::Record {
                record: left_rec,
                position: left_pos,
                ..
            },
            SegmentData::Record {
                record: right_rec,
                position: right_pos,
                ..
            },
        ) = (&left.data, &right.data)
        else {
            continue;
        };
        if left_rec.phase == right_rec.phase {
            continue;
        }

        let t_k = left.hi_k;
        let left_meta = left_rec.transition_near(t_k, TRANSITION_MATCH_TOL_K);
        let right_meta = right_rec.transition_near(t_k, TRANSITION_MATCH_TOL_K);
        let (meta, quality): (Option<&TransitionData>, TransitionQuality) =
            match (left_meta, right_meta) {
                (Some(l), Some(r)) if latent_heats_agree(l, r) => {
                    (Some(l), TransitionQuality::Quantified)
                }
                (Some(l), Some(r)) => {
                    let chosen =
                        match compare_priority(left_rec, *left_pos, right_rec, *right_pos) {
                            Ordering::Greater => r,
                            _ => l,
                        };
                    tracing::warn!(
                        formula,
                        t_k,
                        left_dh = l.enthalpy_j_per_mol,
                        right_dh = r.enthalpy_j_per_mol,
                        chosen_dh = chosen.enthalpy_j_per_mol,
                        "conflicting transition enthalpies"
                    );
                    (Some(chosen), TransitionQuality::Conflicting)
                }
                (Some(m), None) | (None, Some(m)) => (Some(m), TransitionQuality::Quantified),
                (None, None) => (None, TransitionQuality::Unquantified),
            };

        transitions.push(PhaseTransition {
            formula: formula.to_string(),
            temperature_k: t_k,
            from: left_rec.phase,
            to: right_rec.phase,
            enthalpy_j_per_mol: meta.map_or(0.0, |m| m.enthalpy_j_per_mol),
            entropy_j_per_mol_k: meta.map_or(0.0, TransitionData::entropy),
            quality,
        });
    }
    transitions
}

fn latent_heats_agree(a: &TransitionData, b: &TransitionData) -> bool {
    let close = |x: f64, y: f64| (x - y).abs() <= 1e-6 * x.abs().max(y.abs()).max(1.0);
    close(a.enthalpy_j_per_mol, b.enthalpy_j_per_mol) && close(a.entropy(), b.entropy())
}

/// Re-anchor placeholder records on the end state of the segment before them.
fn chain_placeholder_references(
    formula: &str,
    segments: &mut [PhaseSegment],
    transitions: &[PhaseTransition],
) {
    for i in 0..segments.len() {
        let (before, rest) = segments.split_at_mut(i);
        let current = &mut rest[0];
        let lo_k = current.lo_k;
        let SegmentData::Record {
            record, reference, ..
        } = &mut current.data
        else {
            continue;
        };
        if !record.placeholder_reference {
            continue;
        }

        let previous = before.last().and_then(|prev| match &prev.data {
            SegmentData::Record {
                record: prev_rec,
                reference: prev_ref,
                ..
            } => Some(integrate(prev_rec, prev_ref, prev.hi_k)),
            SegmentData::NoData => None,
        });

        match previous {
            Some(end) => {
                let (dh, ds) = transitions
                    .iter()
                    .find(|tr| same_temperature(tr.temperature_k, lo_k))
                    .map_or((0.0, 0.0), |tr| (tr.enthalpy_j_per_mol, tr.entropy_j_per_mol_k));
                *reference = ReferenceState {
                    t_k: lo_k,
                    h_j_per_mol: end.h_j_per_mol + dh,
                    s_j_per_mol_k: end.s_j_per_mol_k + ds,
                    origin: ReferenceOrigin::Chained,
                };
            }
            None => {
                tracing::warn!(
                    formula,
                    source = %record.source,
                    lo_k,
                    "placeholder reference values with no preceding segment to chain from"
                );
                reference.origin = ReferenceOrigin::Unanchored;
            }
        }
    }
}
