//! Configuration options for the Levenberg-Marquardt algorithm.

use crate::error::{PeakFitError, Result};
use serde::{Deserialize, Serialize};

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of iterations. Default: 200
    pub max_iterations: usize,

    /// Tolerance for relative reduction of the cost. Default: 1e-10
    pub ftol: f64,

    /// Tolerance for relative change in parameter values. Default: 1e-10
    pub xtol: f64,

    /// Tolerance for the largest gradient component. Default: 1e-10
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda. Default: 1e12
    pub max_lambda: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
        }
    }
}

impl LmConfig {
    /// Reject settings the solver cannot work with.
    pub fn validate(&self) -> Result<()> {
        let tolerances = [("ftol", self.ftol), ("xtol", self.xtol), ("gtol", self.gtol)];
        for (name, value) in tolerances {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PeakFitError::ParameterError(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        // Lambda only grows multiplicatively, so it must never reach zero.
        let lambdas = [
            ("initial_lambda", self.initial_lambda),
            ("min_lambda", self.min_lambda),
            ("max_lambda", self.max_lambda),
        ];
        for (name, value) in lambdas {
            if !(value.is_finite() && value > 0.0) {
                return Err(PeakFitError::ParameterError(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        if self.lambda_up_factor <= 1.0 || !(0.0..1.0).contains(&self.lambda_down_factor) {
            return Err(PeakFitError::ParameterError(format!(
                "lambda factors must satisfy up > 1 and 0 <= down < 1, got up={} down={}",
                self.lambda_up_factor, self.lambda_down_factor
            )));
        }
        if self.min_lambda > self.max_lambda {
            return Err(PeakFitError::ParameterError(
                "min_lambda exceeds max_lambda".to_string(),
            ));
        }
        Ok(())
    }
}
