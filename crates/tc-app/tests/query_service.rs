//! Query service against in-memory record sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tc_app::{
    AppError, EngineConfig, Engine, FilteredRecordCache, JsonRecordStore, MemoryCache,
    QueryCompound, ReactionQuery, Role,
};
use tc_data::{
    CompoundRecordSet, CpCorrelation, DataError, Phase, Record, RecordSource, SourceError,
    SourceResult, TransitionData,
};
use tc_phase::{AnchorStatus, PhaseError, Span};

fn store_records() -> Vec<Record> {
    vec![
        Record::new("FeO", Phase::Solid, 298.0, 1650.0)
            .with_reference(-265_053.0, 60.75)
            .with_cp(CpCorrelation::Constant { cp: 55.0 })
            .with_transition(TransitionData {
                temperature_k: 1650.0,
                enthalpy_j_per_mol: 24_058.0,
                entropy_j_per_mol_k: None,
            }),
        Record::new("FeO", Phase::Liquid, 1650.0, 3000.0)
            .with_cp(CpCorrelation::Constant { cp: 68.2 })
            .with_placeholder_reference(),
        // Duplicate of the solid record from a worse source.
        Record::new("FeO", Phase::Solid, 298.15, 1650.0)
            .with_reference(-272_000.0, 57.5)
            .with_cp(CpCorrelation::Constant { cp: 50.0 })
            .with_reliability(3),
        Record::new("CO", Phase::Gas, 298.0, 3000.0)
            .with_reference(-110_530.0, 197.66)
            .with_cp(CpCorrelation::Constant { cp: 31.0 }),
        Record::new("Fe", Phase::Solid, 298.0, 1809.0)
            .with_reference(0.0, 27.28)
            .with_cp(CpCorrelation::Constant { cp: 25.1 }),
        Record::new("Fe", Phase::Liquid, 1809.0, 3000.0)
            .with_cp(CpCorrelation::Constant { cp: 46.0 })
            .with_placeholder_reference(),
        Record::new("CO2", Phase::Gas, 298.0, 3000.0)
            .with_reference(-393_520.0, 213.79)
            .with_cp(CpCorrelation::Constant { cp: 50.0 }),
        Record::new("Fe+2", Phase::Ionic, 298.0, 600.0)
            .with_reference(-89_100.0, -137.7)
            .with_reliability(2),
    ]
}

fn engine() -> Engine {
    Engine::new(
        Arc::new(JsonRecordStore::from_records("memory", store_records())),
        EngineConfig::default(),
    )
}

fn reduction_query() -> ReactionQuery {
    let compound = |formula: &str, role| QueryCompound {
        formula: formula.to_string(),
        role,
        amount: 1.0,
    };
    ReactionQuery {
        equation: "FeO + CO = Fe + CO2".to_string(),
        compounds: vec![
            compound("FeO", Role::Reactant),
            compound("CO", Role::Reactant),
            compound("Fe", Role::Product),
            compound("CO2", Role::Product),
        ],
        temperature_range_k: Some([500.0, 1200.0]),
        step_k: Some(100.0),
        confidence: Some(0.9),
        missing_fields: vec![],
    }
}

#[test]
fn reaction_report_end_to_end() {
    let report = engine().run_reaction(&reduction_query()).unwrap();

    // The requested window is display-only; the table spans the data.
    assert_eq!(
        report.range.resolved,
        Span {
            lo_k: 298.0,
            hi_k: 3000.0
        }
    );
    assert_eq!(report.range.anchor, AnchorStatus::Anchored);
    assert_eq!(
        report.range.requested,
        Some(Span {
            lo_k: 500.0,
            hi_k: 1200.0
        })
    );
    assert!(report.range.is_fully_covered());
    assert!(!report.range.request_exceeds_resolved());

    assert_eq!(report.rows.first().unwrap().t_k, 298.0);
    assert_eq!(report.rows.last().unwrap().t_k, 3000.0);
    assert!(report.rows.iter().any(|r| r.t_k == 1650.0));
    assert!(report.rows.iter().any(|r| r.t_k == 1809.0));

    let formulas: Vec<&str> = report.compounds.iter().map(|c| c.formula.as_str()).collect();
    assert_eq!(formulas, vec!["FeO", "CO", "Fe", "CO2"]);
    assert_eq!(report.compounds[0].filter.duplicates, 1);
    assert!(report.low_confidence().is_empty());

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"anchored\""));
}

#[test]
fn compound_report_tabulates_one_formula() {
    let report = engine().run_compound("Fe", None, Some(250.0)).unwrap();
    assert_eq!(report.summary.formula, "Fe");
    assert_eq!(report.summary.transitions.len(), 1);
    assert!(report.rows.iter().all(|r| r.has_data()));
    let melt = report.rows.iter().find(|r| r.t_k == 1809.0).unwrap();
    assert_eq!(melt.phase, Phase::Solid);
}

#[test]
fn ionic_forms_fall_back_with_low_confidence() {
    let report = engine().run_compound("Fe+2", None, Some(100.0)).unwrap();
    assert_eq!(report.summary.confidence, tc_data::Confidence::Low);
    assert_eq!(report.summary.filter.excluded_forms, 1);
    assert_eq!(report.summary.filter.fallback_admitted, 1);
}

#[test]
fn unknown_formula_has_no_usable_records() {
    let err = engine().run_compound("Xe", None, None).unwrap_err();
    assert!(matches!(
        err,
        AppError::Data(DataError::NoUsableRecords { .. })
    ));
}

#[test]
fn range_only_query_reports_coverage() {
    let report = engine()
        .resolve_range(&["FeO".to_string(), "Fe+2".to_string()], None)
        .unwrap();
    assert_eq!(
        report.range.resolved,
        Span {
            lo_k: 298.0,
            hi_k: 600.0
        }
    );
    assert_eq!(report.coverage.len(), 2);
}

#[test]
fn narrow_range_above_melting_uses_chained_liquid() {
    let mut records = store_records();
    records.push(
        Record::new("Y", Phase::Gas, 1700.0, 2500.0)
            .with_reference(0.0, 200.0)
            .with_cp(CpCorrelation::Constant { cp: 30.0 }),
    );
    let engine = Engine::new(
        Arc::new(JsonRecordStore::from_records("memory", records)),
        EngineConfig::default(),
    );
    let compound = |formula: &str, role| QueryCompound {
        formula: formula.to_string(),
        role,
        amount: 1.0,
    };
    let query = ReactionQuery {
        equation: "FeO = Y".to_string(),
        compounds: vec![compound("FeO", Role::Reactant), compound("Y", Role::Product)],
        temperature_range_k: None,
        step_k: Some(100.0),
        confidence: None,
        missing_fields: vec![],
    };

    let report = engine.run_reaction(&query).unwrap();
    assert_eq!(
        report.range.resolved,
        Span {
            lo_k: 1700.0,
            hi_k: 2500.0
        }
    );
    assert_eq!(report.range.anchor, AnchorStatus::AnchorUnavailable);
    assert!(report.rows.iter().all(|r| r.is_complete()));

    let h_feo_1700 = -265_053.0 + 55.0 * (1650.0 - 298.0) + 24_058.0 + 68.2 * 50.0;
    let first = &report.rows[0];
    assert_eq!(first.t_k, 1700.0);
    let dh = first.delta_h_j_per_mol.unwrap();
    assert!((dh - (0.0 - h_feo_1700)).abs() < 1e-6);
}

struct FailingSource {
    failing_formula: &'static str,
    inner: JsonRecordStore,
}

impl RecordSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn search(
        &self,
        formula: &str,
        phase: Option<Phase>,
        max_records: usize,
    ) -> SourceResult<CompoundRecordSet> {
        if formula == self.failing_formula {
            return Err(SourceError::backend(formula, "connection reset"));
        }
        self.inner.search(formula, phase, max_records)
    }
}

#[test]
fn retrieval_failure_cancels_the_query() {
    let engine = Engine::new(
        Arc::new(FailingSource {
            failing_formula: "CO2",
            inner: JsonRecordStore::from_records("memory", store_records()),
        }),
        EngineConfig::default(),
    );
    let err = engine.run_reaction(&reduction_query()).unwrap_err();
    match err {
        AppError::Data(DataError::Source(SourceError::Backend { formula, message })) => {
            assert_eq!(formula, "CO2");
            assert_eq!(message, "connection reset");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn disjoint_data_is_unresolvable() {
    let records = vec![
        Record::new("A", Phase::Solid, 298.0, 500.0).with_reference(0.0, 0.0),
        Record::new("B", Phase::Solid, 800.0, 1000.0).with_reference(0.0, 0.0),
    ];
    let engine = Engine::new(
        Arc::new(JsonRecordStore::from_records("memory", records)),
        EngineConfig::default(),
    );
    let err = engine
        .resolve_range(&["A".to_string(), "B".to_string()], None)
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Phase(PhaseError::RangeUnresolvable { .. })
    ));
}

struct CountingSource {
    searches: AtomicUsize,
    inner: JsonRecordStore,
}

impl RecordSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    fn search(
        &self,
        formula: &str,
        phase: Option<Phase>,
        max_records: usize,
    ) -> SourceResult<CompoundRecordSet> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(formula, phase, max_records)
    }
}

#[test]
fn cache_serves_repeated_queries() {
    let source = Arc::new(CountingSource {
        searches: AtomicUsize::new(0),
        inner: JsonRecordStore::from_records("memory", store_records()),
    });
    let cache = Arc::new(MemoryCache::new());
    let engine = Engine::new(source.clone(), EngineConfig::default()).with_cache(cache.clone());

    let first = engine.run_reaction(&reduction_query()).unwrap();
    assert_eq!(source.searches.load(Ordering::SeqCst), 4);
    let second = engine.run_reaction(&reduction_query()).unwrap();
    assert_eq!(source.searches.load(Ordering::SeqCst), 4);
    assert_eq!(first, second);

    cache.invalidate("FeO");
    engine.run_reaction(&reduction_query()).unwrap();
    assert_eq!(source.searches.load(Ordering::SeqCst), 5);
}
