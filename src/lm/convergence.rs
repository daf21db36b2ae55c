//! Convergence criteria for optimization algorithms.
//!
//! This module defines the criteria used to determine when an optimization
//! algorithm has converged to a solution.

use crate::lm::config::LmConfig;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Possible convergence states for an optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The algorithm is still running.
    Running,

    /// The algorithm has converged due to a small parameter change.
    ParameterConvergence,

    /// The algorithm has converged due to a small function value change.
    FunctionValueConvergence,

    /// The algorithm has converged due to a small gradient.
    GradientConvergence,

    /// Every parameter is fixed; there was nothing to optimize.
    NoFreeParameters,

    /// The algorithm has terminated due to reaching the maximum number of iterations.
    MaxIterationsReached,

    /// The damping parameter hit its upper limit without finding a better point.
    DampingLimitReached,

    /// The algorithm has terminated due to a numerical error.
    NumericalError,
}

impl ConvergenceStatus {
    /// Returns true if the optimization has terminated (either converged or failed).
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::Running)
    }

    /// Returns true if the optimization has converged.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::FunctionValueConvergence
                | ConvergenceStatus::GradientConvergence
                | ConvergenceStatus::NoFreeParameters
        )
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> String {
        match self {
            ConvergenceStatus::Running => "Optimization is still running".to_string(),
            ConvergenceStatus::ParameterConvergence => {
                "Converged: small parameter change".to_string()
            }
            ConvergenceStatus::FunctionValueConvergence => {
                "Converged: small function value change".to_string()
            }
            ConvergenceStatus::GradientConvergence => "Converged: small gradient".to_string(),
            ConvergenceStatus::NoFreeParameters => "Converged: no free parameters".to_string(),
            ConvergenceStatus::MaxIterationsReached => {
                "Terminated: maximum iterations reached".to_string()
            }
            ConvergenceStatus::DampingLimitReached => {
                "Terminated: damping parameter reached its limit".to_string()
            }
            ConvergenceStatus::NumericalError => "Terminated: numerical error".to_string(),
        }
    }
}

/// Criteria for determining when an optimization algorithm has converged.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    /// Tolerance for change in parameter values.
    pub xtol: f64,

    /// Tolerance for change in function value.
    pub ftol: f64,

    /// Tolerance for gradient norm.
    pub gtol: f64,

    /// Maximum number of iterations.
    pub max_iterations: usize,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self::from(&LmConfig::default())
    }
}

impl From<&LmConfig> for ConvergenceCriteria {
    fn from(config: &LmConfig) -> Self {
        Self::new(config.xtol, config.ftol, config.gtol, config.max_iterations)
    }
}

impl ConvergenceCriteria {
    /// Creates a new set of convergence criteria with the given tolerances.
    pub fn new(xtol: f64, ftol: f64, gtol: f64, max_iterations: usize) -> Self {
        Self {
            xtol,
            ftol,
            gtol,
            max_iterations,
        }
    }

    /// The largest gradient component is below `gtol`.
    pub fn gradient_converged(&self, gradient: &Array1<f64>) -> bool {
        let norm = gradient.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()));
        norm <= self.gtol
    }

    /// The step is small relative to the parameter vector:
    /// `|step| <= xtol * (|params| + xtol)`.
    pub fn step_converged(&self, step: &Array1<f64>, params: &Array1<f64>) -> bool {
        let step_norm = step.dot(step).sqrt();
        let param_norm = params.dot(params).sqrt();
        step_norm <= self.xtol * (param_norm + self.xtol)
    }

    /// Both the actual and the predicted reduction are small relative to the cost.
    pub fn cost_converged(&self, cost: f64, new_cost: f64, predicted_reduction: f64) -> bool {
        if !new_cost.is_finite() {
            return false;
        }
        let scale = self.ftol * cost;
        (cost - new_cost).abs() <= scale && predicted_reduction.abs() <= scale
    }

    /// Checks an accepted step, in order: iterations, parameters, cost.
    pub fn check(
        &self,
        step: &Array1<f64>,
        new_params: &Array1<f64>,
        cost: f64,
        new_cost: f64,
        predicted_reduction: f64,
        iterations: usize,
    ) -> ConvergenceStatus {
        if self.step_converged(step, new_params) {
            ConvergenceStatus::ParameterConvergence
        } else if self.cost_converged(cost, new_cost, predicted_reduction) {
            ConvergenceStatus::FunctionValueConvergence
        } else if iterations >= self.max_iterations {
            ConvergenceStatus::MaxIterationsReached
        } else {
            ConvergenceStatus::Running
        }
    }
}
