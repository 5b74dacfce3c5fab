//! Single-compound property tables.

use crate::calculator::{TransitionNote, notes_for, point_at};
use crate::error::ReactionResult;
use crate::grid::temperature_grid;
use serde::{Deserialize, Serialize};
use tc_data::Phase;
use tc_phase::{CompoundPhases, Span};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundTableRow {
    pub t_k: f64,
    pub phase: Phase,
    pub cp_j_per_mol_k: Option<f64>,
    pub h_j_per_mol: Option<f64>,
    pub s_j_per_mol_k: Option<f64>,
    pub g_j_per_mol: Option<f64>,
    pub transitions: Vec<TransitionNote>,
}

impl CompoundTableRow {
    pub fn has_data(&self) -> bool {
        self.h_j_per_mol.is_some()
    }
}

/// Tabulate Cp, H, S and G of one compound over `range`.
///
/// H, S and G stay empty on a placeholder segment that could not be chained.
pub fn compound_table(
    phases: &CompoundPhases,
    range: Span,
    step_k: f64,
) -> ReactionResult<Vec<CompoundTableRow>> {
    let transition_temps: Vec<f64> = phases.transitions.iter().map(|t| t.temperature_k).collect();
    let grid = temperature_grid(range, step_k, &transition_temps)?;

    let mut rows = Vec::with_capacity(grid.len());
    let mut prev_k = None;
    for &t_k in &grid {
        let sample = point_at(phases, t_k)?;
        let point = sample.point;
        let anchored = point.filter(|_| sample.anchored);
        rows.push(CompoundTableRow {
            t_k,
            phase: sample.phase,
            cp_j_per_mol_k: point.map(|p| p.cp_j_per_mol_k),
            h_j_per_mol: anchored.map(|p| p.h_j_per_mol),
            s_j_per_mol_k: anchored.map(|p| p.s_j_per_mol_k),
            g_j_per_mol: anchored.map(|p| p.g_j_per_mol()),
            transitions: notes_for(phases.transitions.iter(), prev_k, t_k),
        });
        prev_k = Some(t_k);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_data::{CpCorrelation, Record, TransitionData};
    use tc_phase::build_segments;

    #[test]
    fn table_switches_phase_at_melting_point() {
        let records = vec![
            Record::new("Al", Phase::Solid, 298.0, 933.0)
                .with_reference(0.0, 28.3)
                .with_cp(CpCorrelation::Constant { cp: 24.2 })
                .with_transition(TransitionData {
                    temperature_k: 933.0,
                    enthalpy_j_per_mol: 10_700.0,
                    entropy_j_per_mol_k: None,
                }),
            Record::new("Al", Phase::Liquid, 933.0, 2000.0)
                .with_cp(CpCorrelation::Constant { cp: 31.8 })
                .with_placeholder_reference(),
        ];
        let range = Span {
            lo_k: 298.0,
            hi_k: 1500.0,
        };
        let phases = build_segments("Al", &records, range).unwrap();
        let rows = compound_table(&phases, range, 200.0).unwrap();

        let melt = rows.iter().find(|r| r.t_k == 933.0).unwrap();
        assert_eq!(melt.phase, Phase::Solid);
        assert_eq!(melt.transitions.len(), 1);

        let next = rows.iter().find(|r| r.t_k == 1098.0).unwrap();
        assert_eq!(next.phase, Phase::Liquid);
        assert_eq!(next.cp_j_per_mol_k, Some(31.8));

        let h_solid_end = melt.h_j_per_mol.unwrap();
        let h_liquid = next.h_j_per_mol.unwrap();
        assert!((h_liquid - (h_solid_end + 10_700.0 + 31.8 * 165.0)).abs() < 1e-6);
        assert!(rows.iter().all(CompoundTableRow::has_data));
    }

    #[test]
    fn gap_rows_have_no_values() {
        let records = vec![
            Record::new("X", Phase::Solid, 298.0, 600.0).with_reference(0.0, 0.0),
            Record::new("X", Phase::Solid, 700.0, 900.0).with_reference(0.0, 0.0),
        ];
        let range = Span {
            lo_k: 298.0,
            hi_k: 900.0,
        };
        let phases = build_segments("X", &records, range).unwrap();
        let rows = compound_table(&phases, range, 50.0).unwrap();
        let gap = rows.iter().find(|r| r.t_k == 648.0).unwrap();
        assert_eq!(gap.phase, Phase::NoData);
        assert_eq!(gap.g_j_per_mol, None);
    }

    #[test]
    fn unanchored_rows_keep_cp_only() {
        let records = vec![
            Record::new("X", Phase::Liquid, 600.0, 900.0)
                .with_cp(CpCorrelation::Constant { cp: 60.0 })
                .with_placeholder_reference(),
        ];
        let range = Span {
            lo_k: 600.0,
            hi_k: 900.0,
        };
        let phases = build_segments("X", &records, range).unwrap();
        let rows = compound_table(&phases, range, 100.0).unwrap();
        assert_eq!(rows.len(), 4);
        for row in &rows {
            assert_eq!(row.cp_j_per_mol_k, Some(60.0));
            assert_eq!(row.h_j_per_mol, None);
            assert!(!row.has_data());
        }
    }
}
