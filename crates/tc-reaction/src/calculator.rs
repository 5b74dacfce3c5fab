//! Reaction calculator.
//!
//! For every grid temperature each participant's active segment is looked
//! up (a boundary point belongs to the segment ending there), evaluated, and
//! weighted by its signed coefficient:
//!
//! ```text
//! ΔH = Σ νᵢ·Hᵢ    ΔS = Σ νᵢ·Sᵢ    ΔG = ΔH − T·ΔS    ln K = −ΔG / (R·T)
//! ```
//!
//! A participant sitting in a no-data segment does not abort the table: the
//! row is still emitted with empty aggregates and a gap flag. The same holds
//! for a participant whose placeholder reference could not be chained.

use crate::error::{ReactionError, ReactionResult};
use crate::grid::temperature_grid;
use crate::spec::ReactionSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tc_core::{GAS_CONSTANT_J_PER_MOL_K, same_temperature};
use tc_data::Phase;
use tc_phase::{
    CompoundPhases, PhaseError, PhaseSegment, PhaseTransition, Span, ThermoPoint,
    TransitionQuality, evaluate,
};

/// Phase a participant is in at a row's temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePhase {
    pub formula: String,
    pub phase: Phase,
}

/// A phase transition at (or crossed on the way to) a row's temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionNote {
    pub formula: String,
    pub temperature_k: f64,
    pub from: Phase,
    pub to: Phase,
    pub enthalpy_j_per_mol: f64,
    pub entropy_j_per_mol_k: f64,
    pub quality: TransitionQuality,
    /// The transition lies between the previous row and this one.
    pub crossed: bool,
}

impl TransitionNote {
    fn from_transition(tr: &PhaseTransition, crossed: bool) -> Self {
        Self {
            formula: tr.formula.clone(),
            temperature_k: tr.temperature_k,
            from: tr.from,
            to: tr.to,
            enthalpy_j_per_mol: tr.enthalpy_j_per_mol,
            entropy_j_per_mol_k: tr.entropy_j_per_mol_k,
            quality: tr.quality,
            crossed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowQuality {
    Complete,
    /// Listed compounds have no data at this temperature.
    Gap { compounds: Vec<String> },
    /// Listed compounds only carry placeholder reference values here.
    Unanchored { compounds: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionCalculationRow {
    pub t_k: f64,
    pub delta_h_j_per_mol: Option<f64>,
    pub delta_s_j_per_mol_k: Option<f64>,
    pub delta_g_j_per_mol: Option<f64>,
    pub ln_k: Option<f64>,
    /// In participant order.
    pub phases: Vec<ActivePhase>,
    pub transitions: Vec<TransitionNote>,
    pub quality: RowQuality,
}

impl ReactionCalculationRow {
    pub fn is_complete(&self) -> bool {
        matches!(self.quality, RowQuality::Complete)
    }

    pub fn phase_of(&self, formula: &str) -> Option<Phase> {
        self.phases
            .iter()
            .find(|p| p.formula == formula)
            .map(|p| p.phase)
    }

    /// Equilibrium constant, when ln K is defined.
    pub fn k(&self) -> Option<f64> {
        self.ln_k.map(f64::exp)
    }
}

/// One compound at one grid temperature.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub phase: Phase,
    /// `None` in a no-data segment.
    pub point: Option<ThermoPoint>,
    /// False when the segment's placeholder reference could not be chained;
    /// only Cp is meaningful then.
    pub anchored: bool,
}

/// Locate and evaluate `formula`'s segment at `t_k`.
pub(crate) fn point_at(phases: &CompoundPhases, t_k: f64) -> ReactionResult<Sample> {
    let Some(segment) = phases.segment_at(t_k) else {
        return Err(contract(
            &phases.formula,
            t_k,
            PhaseError::OutOfSegmentRange {
                t_k,
                lo_k: phases.range.lo_k,
                hi_k: phases.range.hi_k,
            },
        ));
    };
    if segment.is_no_data() {
        return Ok(Sample {
            phase: Phase::NoData,
            point: None,
            anchored: true,
        });
    }
    let point = evaluate_selected(&phases.formula, segment, t_k)?;
    Ok(Sample {
        phase: segment.phase(),
        point: Some(point),
        anchored: segment.is_anchored(),
    })
}

fn evaluate_selected(
    formula: &str,
    segment: &PhaseSegment,
    t_k: f64,
) -> ReactionResult<ThermoPoint> {
    evaluate(segment, t_k).map_err(|source| contract(formula, t_k, source))
}

fn contract(formula: &str, t_k: f64, source: PhaseError) -> ReactionError {
    tracing::error!(formula, t_k, error = %source, "evaluation contract violated");
    ReactionError::Contract {
        formula: formula.to_string(),
        t_k,
        source,
    }
}

/// Transitions at `t_k`, or strictly between `prev_k` and `t_k`.
pub(crate) fn notes_for<'a>(
    transitions: impl Iterator<Item = &'a PhaseTransition>,
    prev_k: Option<f64>,
    t_k: f64,
) -> Vec<TransitionNote> {
    transitions
        .filter_map(|tr| {
            let at = same_temperature(tr.temperature_k, t_k);
            let crossed = !at
                && prev_k.is_some_and(|p| {
                    p < tr.temperature_k
                        && tr.temperature_k < t_k
                        && !same_temperature(p, tr.temperature_k)
                });
            (at || crossed).then(|| TransitionNote::from_transition(tr, crossed))
        })
        .collect()
}

/// Tabulate ΔH, ΔS, ΔG and ln K for `spec` over `range`.
///
/// Every participant must be present in `compounds`; the map is typically
/// the output of `build_segments` for each participant over the same range.
pub fn calculate(
    spec: &ReactionSpec,
    compounds: &BTreeMap<String, CompoundPhases>,
    range: Span,
) -> ReactionResult<Vec<ReactionCalculationRow>> {
    spec.validate()?;

    let participants: Vec<(&CompoundPhases, f64)> = spec
        .participants
        .iter()
        .map(|p| {
            compounds
                .get(&p.formula)
                .map(|phases| (phases, p.coefficient))
                .ok_or_else(|| ReactionError::UnknownCompound {
                    formula: p.formula.clone(),
                })
        })
        .collect::<ReactionResult<_>>()?;

    let transition_temps: Vec<f64> = participants
        .iter()
        .flat_map(|(phases, _)| phases.transitions.iter().map(|tr| tr.temperature_k))
        .collect();
    let grid = temperature_grid(range, spec.step_k, &transition_temps)?;

    let mut rows = Vec::with_capacity(grid.len());
    let mut prev_k = None;
    for &t_k in &grid {
        let mut delta_h = 0.0;
        let mut delta_s = 0.0;
        let mut phases = Vec::with_capacity(participants.len());
        let mut gaps = Vec::new();
        let mut unanchored = Vec::new();

        for (compound, coefficient) in &participants {
            let sample = point_at(compound, t_k)?;
            match sample.point {
                Some(_) if !sample.anchored => unanchored.push(compound.formula.clone()),
                Some(point) => {
                    delta_h += coefficient * point.h_j_per_mol;
                    delta_s += coefficient * point.s_j_per_mol_k;
                }
                None => gaps.push(compound.formula.clone()),
            }
            phases.push(ActivePhase {
                formula: compound.formula.clone(),
                phase: sample.phase,
            });
        }

        let transitions = notes_for(
            participants
                .iter()
                .flat_map(|(phases, _)| phases.transitions.iter()),
            prev_k,
            t_k,
        );

        let quality = if !gaps.is_empty() {
            RowQuality::Gap { compounds: gaps }
        } else if !unanchored.is_empty() {
            RowQuality::Unanchored {
                compounds: unanchored,
            }
        } else {
            RowQuality::Complete
        };
        let row = if quality == RowQuality::Complete {
            let delta_g = delta_h - t_k * delta_s;
            ReactionCalculationRow {
                t_k,
                delta_h_j_per_mol: Some(delta_h),
                delta_s_j_per_mol_k: Some(delta_s),
                delta_g_j_per_mol: Some(delta_g),
                ln_k: Some(-delta_g / (GAS_CONSTANT_J_PER_MOL_K * t_k)),
                phases,
                transitions,
                quality,
            }
        } else {
            ReactionCalculationRow {
                t_k,
                delta_h_j_per_mol: None,
                delta_s_j_per_mol_k: None,
                delta_g_j_per_mol: None,
                ln_k: None,
                phases,
                transitions,
                quality,
            }
        };
        rows.push(row);
        prev_k = Some(t_k);
    }

    let incomplete_rows = rows.iter().filter(|r| !r.is_complete()).count();
    if incomplete_rows > 0 {
        tracing::warn!(
            equation = %spec.equation,
            incomplete_rows,
            "reaction table has rows without usable data"
        );
    }
    tracing::debug!(equation = %spec.equation, rows = rows.len(), "reaction table computed");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Participant;
    use tc_data::{CpCorrelation, Record, TransitionData};
    use tc_phase::build_segments;

    fn span(lo: f64, hi: f64) -> Span {
        Span { lo_k: lo, hi_k: hi }
    }

    fn constant(formula: &str, phase: Phase, lo: f64, hi: f64, h: f64, s: f64, cp: f64) -> Record {
        Record::new(formula, phase, lo, hi)
            .with_reference(h, s)
            .with_cp(CpCorrelation::Constant { cp })
    }

    fn compounds(entries: Vec<(&str, Vec<Record>)>, range: Span) -> BTreeMap<String, CompoundPhases> {
        entries
            .into_iter()
            .map(|(f, records)| (f.to_string(), build_segments(f, &records, range).unwrap()))
            .collect()
    }

    fn iron(range: Span) -> (String, CompoundPhases) {
        let records = vec![
            constant("Fe", Phase::Solid, 298.0, 1809.0, 0.0, 27.3, 25.1).with_transition(
                TransitionData {
                    temperature_k: 1809.0,
                    enthalpy_j_per_mol: 13_810.0,
                    entropy_j_per_mol_k: None,
                },
            ),
            Record::new("Fe", Phase::Liquid, 1809.0, 3000.0)
                .with_cp(CpCorrelation::Constant { cp: 46.0 })
                .with_placeholder_reference(),
        ];
        ("Fe".to_string(), build_segments("Fe", &records, range).unwrap())
    }

    #[test]
    fn reference_temperature_row_is_exact_weighted_sum() {
        let range = span(298.0, 1000.0);
        let map = compounds(
            vec![
                ("A", vec![constant("A", Phase::Solid, 298.0, 1000.0, -100_000.0, 50.0, 30.0)]),
                ("B", vec![constant("B", Phase::Gas, 298.0, 1000.0, -20_000.0, 200.0, 29.0)]),
                ("C", vec![constant("C", Phase::Solid, 298.0, 1000.0, -150_000.0, 70.0, 45.0)]),
            ],
            range,
        );
        let spec = ReactionSpec::new(
            "A + 2B = C",
            vec![
                Participant::reactant("A", 1.0),
                Participant::reactant("B", 2.0),
                Participant::product("C", 1.0),
            ],
            100.0,
        )
        .unwrap();

        let rows = calculate(&spec, &map, range).unwrap();
        let first = &rows[0];
        assert_eq!(first.t_k, 298.0);
        let expected_h = -1.0 * -100_000.0 + -2.0 * -20_000.0 + 1.0 * -150_000.0;
        let expected_s = -1.0 * 50.0 + -2.0 * 200.0 + 1.0 * 70.0;
        assert_eq!(first.delta_h_j_per_mol, Some(expected_h));
        assert_eq!(first.delta_s_j_per_mol_k, Some(expected_s));
        assert_eq!(
            first.delta_g_j_per_mol,
            Some(expected_h - 298.0 * expected_s)
        );
        assert!(first.is_complete());
    }

    #[test]
    fn transition_row_inserted_and_annotated() {
        let range = span(298.0, 2000.0);
        let (fe, phases) = iron(range);
        let mut map = BTreeMap::new();
        map.insert(fe, phases);
        let spec = ReactionSpec::new("Fe = Fe", vec![Participant::product("Fe", 1.0)], 100.0)
            .unwrap();

        let rows = calculate(&spec, &map, range).unwrap();
        let at = rows.iter().find(|r| r.t_k == 1809.0).unwrap();
        assert_eq!(at.phase_of("Fe"), Some(Phase::Solid));
        assert_eq!(at.transitions.len(), 1);
        assert!(!at.transitions[0].crossed);
        assert_eq!(at.transitions[0].to, Phase::Liquid);

        let after = rows.iter().find(|r| r.t_k == 1898.0).unwrap();
        assert_eq!(after.phase_of("Fe"), Some(Phase::Liquid));
        assert!(after.transitions.is_empty());
        assert!(rows.windows(2).all(|w| w[0].t_k < w[1].t_k));
    }

    #[test]
    fn gap_rows_are_flagged_not_dropped() {
        let range = span(298.0, 900.0);
        let map = compounds(
            vec![
                (
                    "X",
                    vec![
                        constant("X", Phase::Solid, 298.0, 600.0, -1_000.0, 10.0, 20.0),
                        constant("X", Phase::Solid, 700.0, 900.0, -1_000.0, 10.0, 20.0),
                    ],
                ),
                ("Y", vec![constant("Y", Phase::Gas, 298.0, 900.0, 0.0, 100.0, 29.0)]),
            ],
            range,
        );
        let spec = ReactionSpec::new(
            "X = Y",
            vec![Participant::reactant("X", 1.0), Participant::product("Y", 1.0)],
            50.0,
        )
        .unwrap();

        let rows = calculate(&spec, &map, range).unwrap();
        let gap = rows.iter().find(|r| r.t_k == 648.0).unwrap();
        assert_eq!(
            gap.quality,
            RowQuality::Gap {
                compounds: vec!["X".to_string()]
            }
        );
        assert_eq!(gap.delta_h_j_per_mol, None);
        assert_eq!(gap.ln_k, None);
        assert_eq!(gap.phase_of("X"), Some(Phase::NoData));
        assert_eq!(gap.phase_of("Y"), Some(Phase::Gas));

        // 598 K is still inside the first record.
        assert!(rows.iter().find(|r| r.t_k == 598.0).unwrap().is_complete());
        assert_eq!(rows.len(), 14);
    }

    #[test]
    fn unanchored_placeholder_rows_carry_no_aggregates() {
        let range = span(600.0, 900.0);
        let map = compounds(
            vec![
                (
                    "X",
                    vec![
                        Record::new("X", Phase::Liquid, 600.0, 900.0)
                            .with_cp(CpCorrelation::Constant { cp: 60.0 })
                            .with_placeholder_reference(),
                    ],
                ),
                ("Y", vec![constant("Y", Phase::Gas, 298.0, 900.0, 0.0, 100.0, 29.0)]),
            ],
            range,
        );
        let spec = ReactionSpec::new(
            "X = Y",
            vec![Participant::reactant("X", 1.0), Participant::product("Y", 1.0)],
            100.0,
        )
        .unwrap();

        let rows = calculate(&spec, &map, range).unwrap();
        assert_eq!(rows.len(), 4);
        for row in &rows {
            assert_eq!(
                row.quality,
                RowQuality::Unanchored {
                    compounds: vec!["X".to_string()]
                }
            );
            assert_eq!(row.delta_h_j_per_mol, None);
            assert_eq!(row.ln_k, None);
            assert_eq!(row.phase_of("X"), Some(Phase::Liquid));
        }
    }

    #[test]
    fn missing_compound_is_reported() {
        let range = span(298.0, 900.0);
        let map = compounds(
            vec![("Y", vec![constant("Y", Phase::Gas, 298.0, 900.0, 0.0, 100.0, 29.0)])],
            range,
        );
        let spec = ReactionSpec::new(
            "X = Y",
            vec![Participant::reactant("X", 1.0), Participant::product("Y", 1.0)],
            100.0,
        )
        .unwrap();
        assert_eq!(
            calculate(&spec, &map, range).unwrap_err(),
            ReactionError::UnknownCompound {
                formula: "X".to_string()
            }
        );
    }

    #[test]
    fn range_beyond_segments_is_a_contract_error() {
        let built = span(298.0, 600.0);
        let map = compounds(
            vec![("Y", vec![constant("Y", Phase::Gas, 298.0, 600.0, 0.0, 100.0, 29.0)])],
            built,
        );
        let spec = ReactionSpec::new("Y", vec![Participant::product("Y", 1.0)], 100.0).unwrap();
        let err = calculate(&spec, &map, span(298.0, 900.0)).unwrap_err();
        assert!(matches!(err, ReactionError::Contract { .. }));
    }

    #[test]
    fn ln_k_sign_follows_delta_g() {
        let range = span(300.0, 400.0);
        let map = compounds(
            vec![
                ("A", vec![constant("A", Phase::Gas, 298.0, 1000.0, 0.0, 0.0, 0.0)]),
                ("B", vec![constant("B", Phase::Gas, 298.0, 1000.0, -10_000.0, 0.0, 0.0)]),
            ],
            range,
        );
        let spec = ReactionSpec::new(
            "A = B",
            vec![Participant::reactant("A", 1.0), Participant::product("B", 1.0)],
            100.0,
        )
        .unwrap();
        let rows = calculate(&spec, &map, range).unwrap();
        let ln_k = rows[0].ln_k.unwrap();
        assert!((ln_k - 10_000.0 / (GAS_CONSTANT_J_PER_MOL_K * 300.0)).abs() < 1e-12);
        assert!(rows[0].k().unwrap() > 1.0);
    }

    #[test]
    fn crossed_transition_noted_on_following_row() {
        let tr = PhaseTransition {
            formula: "Z".into(),
            temperature_k: 450.0,
            from: Phase::Solid,
            to: Phase::Liquid,
            enthalpy_j_per_mol: 0.0,
            entropy_j_per_mol_k: 0.0,
            quality: TransitionQuality::Unquantified,
        };
        let notes = notes_for(std::iter::once(&tr), Some(400.0), 500.0);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].crossed);
        assert!(notes_for(std::iter::once(&tr), None, 500.0).is_empty());
        assert!(notes_for(std::iter::once(&tr), Some(500.0), 600.0).is_empty());
    }
}
