//! Heat-capacity correlations.
//!
//! Each family is integrated in closed form. Evaluation always uses the
//! family stored on the record; there is no numeric quadrature fallback.

use serde::{Deserialize, Serialize};

/// Cp(T) correlation stored on a record, in J/(mol·K) with T in kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum CpCorrelation {
    /// Six-term polynomial used by most tabulated databases:
    ///
    /// ```text
    /// Cp = a + b·T + c/T² + d·T² + e/T³ + f·T³
    /// ```
    Polynomial {
        a: f64,
        #[serde(default)]
        b: f64,
        #[serde(default)]
        c: f64,
        #[serde(default)]
        d: f64,
        #[serde(default)]
        e: f64,
        #[serde(default)]
        f: f64,
    },
    /// NIST Shomate form with t = T/1000:
    ///
    /// ```text
    /// Cp = A + B·t + C·t² + D·t³ + E/t²
    /// ```
    Shomate {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
    },
    /// Temperature-independent heat capacity.
    Constant { cp: f64 },
}

impl CpCorrelation {
    pub fn name(&self) -> &'static str {
        match self {
            CpCorrelation::Polynomial { .. } => "polynomial",
            CpCorrelation::Shomate { .. } => "shomate",
            CpCorrelation::Constant { .. } => "constant",
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            CpCorrelation::Polynomial { a, b, c, d, e, f } => {
                [a, b, c, d, e, f].iter().all(|v| v.is_finite())
            }
            CpCorrelation::Shomate { a, b, c, d, e } => {
                [a, b, c, d, e].iter().all(|v| v.is_finite())
            }
            CpCorrelation::Constant { cp } => cp.is_finite(),
        }
    }

    /// Heat capacity at `t_k` [J/(mol·K)].
    pub fn cp(&self, t_k: f64) -> f64 {
        match *self {
            CpCorrelation::Polynomial { a, b, c, d, e, f } => {
                a + b * t_k + c / (t_k * t_k) + d * t_k * t_k + e / (t_k * t_k * t_k)
                    + f * t_k * t_k * t_k
            }
            CpCorrelation::Shomate { a, b, c, d, e } => {
                let t = t_k / 1000.0;
                a + b * t + c * t * t + d * t * t * t + e / (t * t)
            }
            CpCorrelation::Constant { cp } => cp,
        }
    }

    /// ∫ Cp dT from `t1_k` to `t2_k` [J/mol].
    pub fn enthalpy_integral(&self, t1_k: f64, t2_k: f64) -> f64 {
        if t1_k == t2_k {
            return 0.0;
        }
        match *self {
            CpCorrelation::Constant { cp } => cp * (t2_k - t1_k),
            _ => self.enthalpy_antiderivative(t2_k) - self.enthalpy_antiderivative(t1_k),
        }
    }

    /// ∫ Cp/T dT from `t1_k` to `t2_k` [J/(mol·K)].
    pub fn entropy_integral(&self, t1_k: f64, t2_k: f64) -> f64 {
        if t1_k == t2_k {
            return 0.0;
        }
        match *self {
            CpCorrelation::Constant { cp } => cp * (t2_k / t1_k).ln(),
            _ => self.entropy_antiderivative(t2_k) - self.entropy_antiderivative(t1_k),
        }
    }

    fn enthalpy_antiderivative(&self, t_k: f64) -> f64 {
        match *self {
            CpCorrelation::Polynomial { a, b, c, d, e, f } => {
                let t2 = t_k * t_k;
                a * t_k + b * t2 / 2.0 - c / t_k + d * t2 * t_k / 3.0 - e / (2.0 * t2)
                    + f * t2 * t2 / 4.0
            }
            CpCorrelation::Shomate { a, b, c, d, e } => {
                let t = t_k / 1000.0;
                1000.0
                    * (a * t + b * t * t / 2.0 + c * t * t * t / 3.0 + d * t * t * t * t / 4.0
                        - e / t)
            }
            CpCorrelation::Constant { cp } => cp * t_k,
        }
    }

    fn entropy_antiderivative(&self, t_k: f64) -> f64 {
        match *self {
            CpCorrelation::Polynomial { a, b, c, d, e, f } => {
                let t2 = t_k * t_k;
                a * t_k.ln() + b * t_k - c / (2.0 * t2) + d * t2 / 2.0 - e / (3.0 * t2 * t_k)
                    + f * t2 * t_k / 3.0
            }
            CpCorrelation::Shomate { a, b, c, d, e } => {
                let t = t_k / 1000.0;
                a * t.ln() + b * t + c * t * t / 2.0 + d * t * t * t / 3.0 - e / (2.0 * t * t)
            }
            CpCorrelation::Constant { cp } => cp * t_k.ln(),
        }
    }
}
