//! Engine configuration.

use crate::error::{AppError, AppResult, read_file};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tc_data::FilterPolicy;
use tc_reaction::validate_step;

/// Settings shared by every query an [`Engine`](crate::Engine) runs.
///
/// ```yaml
/// filter:
///   include_ionic: false
///   fallback_top_k: 3
/// max_records: 200
/// default_step_k: 100.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub filter: FilterPolicy,
    /// Upper bound passed to every record search.
    pub max_records: usize,
    /// Tabulation step when a query does not give one [K].
    pub default_step_k: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter: FilterPolicy::default(),
            max_records: 200,
            default_step_k: 100.0,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.max_records == 0 {
            return Err(AppError::Config("max_records must be at least 1".to_string()));
        }
        if self.filter.fallback_top_k == 0 {
            return Err(AppError::Config(
                "filter.fallback_top_k must be at least 1".to_string(),
            ));
        }
        if !self.filter.duplicate_tolerance_k.is_finite() || self.filter.duplicate_tolerance_k < 0.0
        {
            return Err(AppError::Config(
                "filter.duplicate_tolerance_k must be a non-negative number".to_string(),
            ));
        }
        validate_step(self.default_step_k)
            .map_err(|e| AppError::Config(format!("default_step_k: {}", e)))?;
        Ok(())
    }
}

/// Load engine configuration from a YAML file.
pub fn load_config(path: &Path) -> AppResult<EngineConfig> {
    let content = read_file(path)?;
    EngineConfig::from_yaml_str(&content)
}
