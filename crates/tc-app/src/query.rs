//! Query services.
//!
//! A query fetches and filters the records of every compound in parallel,
//! resolves the common range, builds segments and hands the result to the
//! calculator. Any retrieval failure cancels the whole query.

use crate::cache::{CacheKey, FilteredRecordCache, NoCache};
use crate::config::EngineConfig;
use crate::error::{AppError, AppResult, read_file};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tc_data::{
    Confidence, DataError, FilterReport, FilteredRecords, Record, RecordSource, filter_records,
};
use tc_phase::{
    CalculationRange, CompoundCoverage, CompoundPhases, Coverage, PhaseSegment, PhaseTransition,
    Span, build_segments, determine_calculation_range, validate_range_coverage,
};
use tc_reaction::{
    CompoundTableRow, Participant, ReactionCalculationRow, ReactionSpec, calculate,
    compound_table,
};

fn default_amount() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Reactant,
    Product,
}

/// Compound as supplied by the extraction step: role plus unsigned amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCompound {
    pub formula: String,
    pub role: Role,
    #[serde(default = "default_amount")]
    pub amount: f64,
}

/// Structured reaction request (YAML or JSON).
///
/// The requested temperature window is kept for display only; the
/// calculation range always comes from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionQuery {
    pub equation: String,
    pub compounds: Vec<QueryCompound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_range_k: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_k: Option<f64>,
    /// Extraction confidence score, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

impl ReactionQuery {
    pub fn formulas(&self) -> Vec<String> {
        self.compounds.iter().map(|c| c.formula.trim().to_string()).collect()
    }

    pub fn to_spec(&self, default_step_k: f64) -> AppResult<ReactionSpec> {
        let participants = self
            .compounds
            .iter()
            .map(|c| match c.role {
                Role::Reactant => Participant::reactant(c.formula.trim(), c.amount),
                Role::Product => Participant::product(c.formula.trim(), c.amount),
            })
            .collect();
        let step_k = self.step_k.unwrap_or(default_step_k);
        ReactionSpec::new(self.equation.clone(), participants, step_k).map_err(AppError::from)
    }

    pub fn requested_span(&self) -> AppResult<Option<Span>> {
        self.temperature_range_k
            .map(|[lo, hi]| {
                Span::new(lo, hi).map_err(|e| {
                    AppError::InvalidQuery(format!("temperature_range_k [{lo}, {hi}]: {e}"))
                })
            })
            .transpose()
    }
}

/// Load a reaction query from YAML (JSON documents parse too).
pub fn load_query(path: &Path) -> AppResult<ReactionQuery> {
    let content = read_file(path)?;
    serde_yaml::from_str(&content).map_err(|e| AppError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Per-compound outcome of filtering and segment building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSummary {
    pub formula: String,
    pub confidence: Confidence,
    pub filter: FilterReport,
    pub records_used: usize,
    pub coverage: Coverage,
    pub segments: Vec<PhaseSegment>,
    pub transitions: Vec<PhaseTransition>,
}

impl CompoundSummary {
    fn new(filtered: &FilteredRecords, phases: &CompoundPhases) -> Self {
        Self {
            formula: phases.formula.clone(),
            confidence: filtered.confidence,
            filter: filtered.report.clone(),
            records_used: filtered.records.len(),
            coverage: phases.coverage.clone(),
            segments: phases.segments.clone(),
            transitions: phases.transitions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionReport {
    pub equation: String,
    pub participants: Vec<Participant>,
    pub range: CalculationRange,
    /// In participant order.
    pub compounds: Vec<CompoundSummary>,
    pub rows: Vec<ReactionCalculationRow>,
}

impl ReactionReport {
    /// Compounds whose records came from the filter's fallback.
    pub fn low_confidence(&self) -> Vec<&str> {
        self.compounds
            .iter()
            .filter(|c| c.confidence == Confidence::Low)
            .map(|c| c.formula.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundReport {
    pub range: CalculationRange,
    pub summary: CompoundSummary,
    pub rows: Vec<CompoundTableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeReport {
    pub range: CalculationRange,
    /// Raw record coverage per compound, gaps included.
    pub coverage: Vec<CompoundCoverage>,
}

/// Everything a query needs after range resolution.
struct Prepared {
    filtered: BTreeMap<String, FilteredRecords>,
    phases: BTreeMap<String, CompoundPhases>,
    range: CalculationRange,
    coverage: Vec<CompoundCoverage>,
}

/// Query engine over a record source.
pub struct Engine {
    source: Arc<dyn RecordSource>,
    cache: Arc<dyn FilteredRecordCache>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(source: Arc<dyn RecordSource>, config: EngineConfig) -> Self {
        Self {
            source,
            cache: Arc::new(NoCache),
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn FilteredRecordCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Filtered records for one formula, read through the cache.
    pub fn filtered_records(&self, formula: &str) -> AppResult<FilteredRecords> {
        let key = CacheKey::new(formula, &self.config.filter);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(formula, "filtered records served from cache");
            return Ok(hit);
        }

        let set = self
            .source
            .search(formula, None, self.config.max_records)
            .map_err(DataError::from)?;
        tracing::debug!(
            formula,
            source = self.source.name(),
            candidates = set.len(),
            "fetched records"
        );
        let filtered = filter_records(&set, &self.config.filter)?;
        self.cache.put(key, filtered.clone());
        Ok(filtered)
    }

    fn fetch_all(&self, formulas: &[String]) -> AppResult<BTreeMap<String, FilteredRecords>> {
        let fetched = formulas
            .par_iter()
            .map(|formula| {
                self.filtered_records(formula)
                    .map(|records| (formula.clone(), records))
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(fetched.into_iter().collect())
    }

    fn prepare(&self, formulas: &[String], requested: Option<Span>) -> AppResult<Prepared> {
        if formulas.is_empty() {
            return Err(AppError::InvalidQuery("no compounds given".to_string()));
        }
        let filtered = self.fetch_all(formulas)?;

        let records: BTreeMap<String, Vec<Record>> = filtered
            .iter()
            .map(|(formula, f)| (formula.clone(), f.records.clone()))
            .collect();
        let resolved = determine_calculation_range(&records)?;

        let phases: BTreeMap<String, CompoundPhases> = records
            .iter()
            .map(|(formula, recs)| {
                build_segments(formula, recs, resolved.span).map(|p| (formula.clone(), p))
            })
            .collect::<Result<_, _>>()?;
        let validity = validate_range_coverage(&phases, resolved.span);
        let range = CalculationRange::new(requested, &resolved, validity);

        if range.request_exceeds_resolved() {
            tracing::info!(
                lo_k = range.resolved.lo_k,
                hi_k = range.resolved.hi_k,
                "requested window extends beyond available data"
            );
        }

        Ok(Prepared {
            filtered,
            phases,
            range,
            coverage: resolved.coverage,
        })
    }

    fn summaries(prepared: &Prepared, formulas: &[String]) -> Vec<CompoundSummary> {
        formulas
            .iter()
            .filter_map(|f| {
                let filtered = prepared.filtered.get(f)?;
                let phases = prepared.phases.get(f)?;
                Some(CompoundSummary::new(filtered, phases))
            })
            .collect()
    }

    /// Reaction table for `query`.
    pub fn run_reaction(&self, query: &ReactionQuery) -> AppResult<ReactionReport> {
        let spec = query.to_spec(self.config.default_step_k)?;
        let requested = query.requested_span()?;
        let formulas = query.formulas();

        let prepared = self.prepare(&formulas, requested)?;
        let rows = calculate(&spec, &prepared.phases, prepared.range.resolved)?;

        tracing::info!(
            equation = %spec.equation,
            rows = rows.len(),
            lo_k = prepared.range.resolved.lo_k,
            hi_k = prepared.range.resolved.hi_k,
            "reaction query complete"
        );
        Ok(ReactionReport {
            equation: spec.equation.clone(),
            compounds: Self::summaries(&prepared, &formulas),
            participants: spec.participants,
            range: prepared.range,
            rows,
        })
    }

    /// Property table for one compound.
    pub fn run_compound(
        &self,
        formula: &str,
        requested: Option<Span>,
        step_k: Option<f64>,
    ) -> AppResult<CompoundReport> {
        let formulas = vec![formula.trim().to_string()];
        let prepared = self.prepare(&formulas, requested)?;
        let step_k = step_k.unwrap_or(self.config.default_step_k);

        let phases = prepared
            .phases
            .get(&formulas[0])
            .ok_or_else(|| AppError::InvalidQuery(format!("no data prepared for {formula}")))?;
        let rows = compound_table(phases, prepared.range.resolved, step_k)?;

        let summary = Self::summaries(&prepared, &formulas)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InvalidQuery(format!("no data prepared for {formula}")))?;
        Ok(CompoundReport {
            range: prepared.range,
            summary,
            rows,
        })
    }

    /// Common range of `formulas` without tabulating anything.
    pub fn resolve_range(
        &self,
        formulas: &[String],
        requested: Option<Span>,
    ) -> AppResult<RangeReport> {
        let prepared = self.prepare(formulas, requested)?;
        Ok(RangeReport {
            range: prepared.range,
            coverage: prepared.coverage,
        })
    }
}
