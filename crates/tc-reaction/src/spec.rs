//! Reaction specification.

use crate::error::{ReactionError, ReactionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Smallest accepted tabulation step [K].
pub const MIN_STEP_K: f64 = 1.0;
/// Largest accepted tabulation step [K].
pub const MAX_STEP_K: f64 = 1000.0;

/// One compound with its signed stoichiometric coefficient
/// (reactants negative, products positive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub formula: String,
    pub coefficient: f64,
}

impl Participant {
    pub fn reactant(formula: impl Into<String>, amount: f64) -> Self {
        Self {
            formula: formula.into(),
            coefficient: -amount.abs(),
        }
    }

    pub fn product(formula: impl Into<String>, amount: f64) -> Self {
        Self {
            formula: formula.into(),
            coefficient: amount.abs(),
        }
    }

    pub fn is_reactant(&self) -> bool {
        self.coefficient < 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSpec {
    /// Equation text as given by the caller; not parsed.
    pub equation: String,
    pub participants: Vec<Participant>,
    pub step_k: f64,
}

impl ReactionSpec {
    /// Build and validate.
    pub fn new(
        equation: impl Into<String>,
        participants: Vec<Participant>,
        step_k: f64,
    ) -> ReactionResult<Self> {
        let spec = Self {
            equation: equation.into(),
            participants,
            step_k,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> ReactionResult<()> {
        validate_step(self.step_k)?;
        if self.participants.is_empty() {
            return Err(ReactionError::invalid_spec("reaction has no participants"));
        }
        let mut seen = BTreeSet::new();
        for p in &self.participants {
            if p.formula.trim().is_empty() {
                return Err(ReactionError::invalid_spec("participant with empty formula"));
            }
            if !p.coefficient.is_finite() || p.coefficient == 0.0 {
                return Err(ReactionError::invalid_spec(format!(
                    "coefficient of {} must be finite and non-zero, got {}",
                    p.formula, p.coefficient
                )));
            }
            if !seen.insert(p.formula.as_str()) {
                return Err(ReactionError::invalid_spec(format!(
                    "{} listed more than once",
                    p.formula
                )));
            }
        }
        Ok(())
    }

    pub fn formulas(&self) -> impl Iterator<Item = &str> + '_ {
        self.participants.iter().map(|p| p.formula.as_str())
    }

    pub fn reactants(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.iter().filter(|p| p.is_reactant())
    }

    pub fn products(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.iter().filter(|p| !p.is_reactant())
    }
}

/// Check a tabulation step against [`MIN_STEP_K`]..=[`MAX_STEP_K`].
pub fn validate_step(step_k: f64) -> ReactionResult<f64> {
    if step_k.is_finite() && (MIN_STEP_K..=MAX_STEP_K).contains(&step_k) {
        Ok(step_k)
    } else {
        Err(ReactionError::InvalidStep {
            step_k,
            min_k: MIN_STEP_K,
            max_k: MAX_STEP_K,
        })
    }
}
