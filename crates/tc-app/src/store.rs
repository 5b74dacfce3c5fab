//! File-backed record source.

use crate::error::{AppError, AppResult, read_file};
use std::path::Path;
use tc_data::{CompoundRecordSet, Phase, Record, RecordSource, SourceResult};

/// Records loaded from a JSON array, searched by exact formula.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    name: String,
    records: Vec<Record>,
}

impl JsonRecordStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        let content = read_file(path)?;
        let records: Vec<Record> =
            serde_json::from_str(&content).map_err(|e| AppError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), records = records.len(), "loaded record store");
        Ok(Self {
            name: path.display().to_string(),
            records,
        })
    }

    pub fn from_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct formulas in store order.
    pub fn formulas(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.formula.as_str()) {
                seen.push(record.formula.as_str());
            }
        }
        seen
    }
}

impl RecordSource for JsonRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(
        &self,
        formula: &str,
        phase: Option<Phase>,
        max_records: usize,
    ) -> SourceResult<CompoundRecordSet> {
        let formula = formula.trim();
        let records = self
            .records
            .iter()
            .filter(|r| r.formula == formula)
            .filter(|r| phase.is_none_or(|p| r.phase == p))
            .take(max_records)
            .cloned()
            .collect();
        Ok(CompoundRecordSet::new(formula, records))
    }
}
