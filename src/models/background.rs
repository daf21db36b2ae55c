//! Background models for the composite fit.
//!
//! Every supported background shape lives in [`BackgroundModel`]; adding a new
//! shape means adding a variant here and nowhere else.

use crate::error::{PeakFitError, Result};
use crate::parameters::Parameter;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The shape of a background model, without coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    None,
    Linear,
    Quadratic,
    Exponential,
    PowerLaw,
}

impl BackgroundKind {
    /// Coefficient names, in evaluation order.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            BackgroundKind::None => &[],
            BackgroundKind::Linear => &["slope", "intercept"],
            BackgroundKind::Quadratic => &["a", "b", "c"],
            BackgroundKind::Exponential => &["amplitude", "decay"],
            BackgroundKind::PowerLaw => &["amplitude", "exponent"],
        }
    }

    /// Default starting values, matching [`BackgroundKind::parameter_names`].
    pub fn default_values(self) -> &'static [f64] {
        match self {
            BackgroundKind::None => &[],
            BackgroundKind::Linear => &[1.0, 0.0],
            BackgroundKind::Quadratic => &[0.0, 1.0, 0.0],
            BackgroundKind::Exponential => &[1.0, 1.0],
            BackgroundKind::PowerLaw => &[1.0, 1.0],
        }
    }

    /// Default `(min, max)` for every coefficient. All shapes start unbounded.
    pub fn default_bounds(self) -> Vec<(f64, f64)> {
        vec![(f64::NEG_INFINITY, f64::INFINITY); self.parameter_names().len()]
    }

    /// Evaluate the shape at `x` for the given coefficients.
    pub fn evaluate(self, x: f64, coefficients: &[f64]) -> f64 {
        match (self, coefficients) {
            (BackgroundKind::Linear, &[slope, intercept]) => slope * x + intercept,
            (BackgroundKind::Quadratic, &[a, b, c]) => (a * x + b) * x + c,
            (BackgroundKind::Exponential, &[amplitude, decay]) => amplitude * (-x / decay).exp(),
            (BackgroundKind::PowerLaw, &[amplitude, exponent]) => amplitude * x.powf(exponent),
            _ => 0.0,
        }
    }
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackgroundKind::None => "none",
            BackgroundKind::Linear => "linear",
            BackgroundKind::Quadratic => "quadratic",
            BackgroundKind::Exponential => "exponential",
            BackgroundKind::PowerLaw => "powerlaw",
        };
        f.write_str(name)
    }
}

impl FromStr for BackgroundKind {
    type Err = PeakFitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(BackgroundKind::None),
            "linear" => Ok(BackgroundKind::Linear),
            "quadratic" => Ok(BackgroundKind::Quadratic),
            "exponential" => Ok(BackgroundKind::Exponential),
            "powerlaw" | "power-law" | "power_law" => Ok(BackgroundKind::PowerLaw),
            _ => Err(PeakFitError::UnsupportedBackground(s.to_string())),
        }
    }
}

/// A background model together with its coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackgroundModel {
    None,
    Linear {
        slope: Parameter,
        intercept: Parameter,
    },
    Quadratic {
        a: Parameter,
        b: Parameter,
        c: Parameter,
    },
    Exponential {
        amplitude: Parameter,
        decay: Parameter,
    },
    PowerLaw {
        amplitude: Parameter,
        exponent: Parameter,
    },
}

impl Default for BackgroundModel {
    fn default() -> Self {
        Self::from(BackgroundKind::Linear)
    }
}

impl From<BackgroundKind> for BackgroundModel {
    fn from(kind: BackgroundKind) -> Self {
        let names = kind.parameter_names();
        let values = kind.default_values();
        let param = |i: usize| Parameter::new(&format!("bg_{}", names[i]), values[i]);
        match kind {
            BackgroundKind::None => BackgroundModel::None,
            BackgroundKind::Linear => BackgroundModel::Linear {
                slope: param(0),
                intercept: param(1),
            },
            BackgroundKind::Quadratic => BackgroundModel::Quadratic {
                a: param(0),
                b: param(1),
                c: param(2),
            },
            BackgroundKind::Exponential => BackgroundModel::Exponential {
                amplitude: param(0),
                decay: param(1),
            },
            BackgroundKind::PowerLaw => BackgroundModel::PowerLaw {
                amplitude: param(0),
                exponent: param(1),
            },
        }
    }
}

impl FromStr for BackgroundModel {
    type Err = PeakFitError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<BackgroundKind>().map(Self::from)
    }
}

impl BackgroundModel {
    pub fn kind(&self) -> BackgroundKind {
        match self {
            BackgroundModel::None => BackgroundKind::None,
            BackgroundModel::Linear { .. } => BackgroundKind::Linear,
            BackgroundModel::Quadratic { .. } => BackgroundKind::Quadratic,
            BackgroundModel::Exponential { .. } => BackgroundKind::Exponential,
            BackgroundModel::PowerLaw { .. } => BackgroundKind::PowerLaw,
        }
    }

    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.kind().parameter_names()
    }

    /// Coefficients in the order of [`BackgroundModel::parameter_names`].
    pub fn coefficients(&self) -> Vec<&Parameter> {
        match self {
            BackgroundModel::None => vec![],
            BackgroundModel::Linear { slope, intercept } => vec![slope, intercept],
            BackgroundModel::Quadratic { a, b, c } => vec![a, b, c],
            BackgroundModel::Exponential { amplitude, decay } => vec![amplitude, decay],
            BackgroundModel::PowerLaw {
                amplitude,
                exponent,
            } => vec![amplitude, exponent],
        }
    }

    pub fn coefficients_mut(&mut self) -> Vec<&mut Parameter> {
        match self {
            BackgroundModel::None => vec![],
            BackgroundModel::Linear { slope, intercept } => vec![slope, intercept],
            BackgroundModel::Quadratic { a, b, c } => vec![a, b, c],
            BackgroundModel::Exponential { amplitude, decay } => vec![amplitude, decay],
            BackgroundModel::PowerLaw {
                amplitude,
                exponent,
            } => vec![amplitude, exponent],
        }
    }

    pub fn coefficient_values(&self) -> Vec<f64> {
        self.coefficients().iter().map(|p| p.value()).collect()
    }

    /// Evaluate the background at `x` using the current coefficient values.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.kind().evaluate(x, &self.coefficient_values())
    }

    pub fn varying_count(&self) -> usize {
        self.coefficients().iter().filter(|p| p.vary).count()
    }

    /// Set the coefficient names to `{prefix}{name}`.
    pub fn normalize_names(&mut self, prefix: &str) {
        let names = self.parameter_names();
        for (param, name) in self.coefficients_mut().into_iter().zip(names) {
            param.rename(&format!("{}{}", prefix, name));
        }
    }

    /// Replace the starting values with a closed-form estimate from data.
    ///
    /// Only applied when every coefficient varies; a partially fixed model keeps
    /// the caller's values. Returns whether the guess was applied.
    pub fn guess(&mut self, x: &[f64], y: &[f64]) -> bool {
        if self.varying_count() == 0 || self.varying_count() != self.coefficients().len() {
            return false;
        }

        let estimate = match self.kind() {
            BackgroundKind::None => None,
            BackgroundKind::Linear => polyfit(x, y, 1).map(|p| vec![p[1], p[0]]),
            BackgroundKind::Quadratic => polyfit(x, y, 2).map(|p| vec![p[2], p[1], p[0]]),
            BackgroundKind::Exponential => {
                let (xs, ln_y): (Vec<f64>, Vec<f64>) = x
                    .iter()
                    .zip(y)
                    .filter(|&(_, &y)| y > 0.0)
                    .map(|(&x, &y)| (x, y.ln()))
                    .unzip();
                polyfit(&xs, &ln_y, 1)
                    .filter(|p| p[1] != 0.0)
                    .map(|p| vec![p[0].exp(), -1.0 / p[1]])
            }
            BackgroundKind::PowerLaw => {
                let (ln_x, ln_y): (Vec<f64>, Vec<f64>) = x
                    .iter()
                    .zip(y)
                    .filter(|&(&x, &y)| x > 0.0 && y > 0.0)
                    .map(|(&x, &y)| (x.ln(), y.ln()))
                    .unzip();
                polyfit(&ln_x, &ln_y, 1).map(|p| vec![p[0].exp(), p[1]])
            }
        };

        match estimate {
            Some(values) if values.iter().all(|v| v.is_finite()) => {
                for (param, value) in self.coefficients_mut().into_iter().zip(values) {
                    param.set_value(value);
                }
                true
            }
            _ => false,
        }
    }
}

/// Least-squares polynomial `p[0] + p[1]·x + ... + p[degree]·x^degree`.
///
/// The fit is done in `x - mean(x)` for conditioning and expanded back.
fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = x.len().min(y.len());
    let terms = degree + 1;
    if n < terms {
        return None;
    }

    let mean = x[..n].iter().sum::<f64>() / n as f64;
    let design = DMatrix::from_fn(n, terms, |i, j| (x[i] - mean).powi(j as i32));
    let observed = DVector::from_column_slice(&y[..n]);

    let normal = design.transpose() * &design;
    let rhs = design.transpose() * observed;
    let shifted = normal.cholesky()?.solve(&rhs);

    // Expand sum_j s_j (x - m)^j into powers of x.
    let mut coefficients = vec![0.0; terms];
    for (j, s) in shifted.iter().enumerate() {
        for (k, coefficient) in coefficients.iter_mut().enumerate().take(j + 1) {
            let binomial = binomial(j, k) as f64;
            *coefficient += s * binomial * (-mean).powi((j - k) as i32);
        }
    }
    Some(coefficients)
}

fn binomial(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
