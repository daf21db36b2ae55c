//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core implementation of the Levenberg-Marquardt algorithm
//! for nonlinear least-squares optimization.

use log::{debug, trace};
use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{PeakFitError, Result};
use crate::problem::Problem;

use super::config::LmConfig;
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};
use super::step::LmStep;
use super::trust_region::TrustRegion;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Why the optimization stopped
    pub status: ConvergenceStatus,

    /// Whether the optimization converged
    pub success: bool,

    /// A message describing the result
    pub message: String,

    /// The Jacobian matrix at the solution
    pub jacobian: Array2<f64>,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in residual norm.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the factor by which to increase lambda.
    pub fn with_lambda_up_factor(mut self, factor: f64) -> Self {
        self.config.lambda_up_factor = factor;
        self
    }

    /// Set the factor by which to decrease lambda.
    pub fn with_lambda_down_factor(mut self, factor: f64) -> Self {
        self.config.lambda_down_factor = factor;
        self
    }

    /// Set the minimum value for lambda.
    pub fn with_min_lambda(mut self, min_lambda: f64) -> Self {
        self.config.min_lambda = min_lambda;
        self
    }

    /// Set the maximum value for lambda.
    pub fn with_max_lambda(mut self, max_lambda: f64) -> Self {
        self.config.max_lambda = max_lambda;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter count does not match the problem,
    /// when the configuration is invalid, when the residuals at the starting
    /// point are not finite, or when the problem itself fails to evaluate.
    /// Failing to converge is not an error; it is reported through
    /// [`LmResult::status`].
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        self.config.validate()?;

        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(PeakFitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(PeakFitError::FunctionEvaluation(
                "Residuals at the initial parameters are not finite".to_string(),
            ));
        }
        let mut cost: f64 = residuals.iter().map(|r| r.powi(2)).sum();

        if n_params == 0 {
            return Ok(self.finish(
                params,
                residuals,
                cost,
                0,
                func_evals,
                ConvergenceStatus::NoFreeParameters,
                Array2::zeros((problem.residual_count(), 0)),
            ));
        }

        let criteria = ConvergenceCriteria::from(&self.config);
        let mut trust_region = TrustRegion::from(&self.config);
        let mut jacobian = problem.jacobian(&params)?;
        func_evals += n_params;
        let mut iterations = 0;

        let status = loop {
            let gradient = jacobian.t().dot(&residuals);
            if gradient.iter().any(|g| !g.is_finite()) {
                break ConvergenceStatus::NumericalError;
            }
            if criteria.gradient_converged(&gradient) {
                break ConvergenceStatus::GradientConvergence;
            }
            if iterations >= self.config.max_iterations {
                break ConvergenceStatus::MaxIterationsReached;
            }

            let step = match LmStep::calculate_step(&jacobian, &residuals, &trust_region) {
                Ok(step) => step,
                Err(e) => {
                    trace!("step failed at lambda={:.3e}: {}", trust_region.lambda, e);
                    if trust_region.is_saturated() || !trust_region.increase() {
                        break ConvergenceStatus::DampingLimitReached;
                    }
                    continue;
                }
            };
            iterations += 1;

            let trial_params = &params + &step.step;
            let trial_residuals = problem.eval(&trial_params)?;
            func_evals += 1;
            let trial_cost: f64 = if trial_residuals.iter().all(|r| r.is_finite()) {
                trial_residuals.iter().map(|r| r.powi(2)).sum()
            } else {
                f64::INFINITY
            };

            let ratio = TrustRegion::gain_ratio(cost, trial_cost, step.predicted_reduction);
            trace!(
                "iteration {}: cost={:.6e} trial={:.6e} ratio={:.3} lambda={:.3e}",
                iterations,
                cost,
                trial_cost,
                ratio,
                step.lambda
            );

            if trust_region.update_lambda(ratio) {
                let status = criteria.check(
                    &step.step,
                    &trial_params,
                    cost,
                    trial_cost,
                    step.predicted_reduction,
                    iterations,
                );
                params = trial_params;
                residuals = trial_residuals;
                cost = trial_cost;
                jacobian = problem.jacobian(&params)?;
                func_evals += n_params;

                if status.is_terminated() {
                    break status;
                }
            } else if criteria.step_converged(&step.step, &params) {
                break ConvergenceStatus::ParameterConvergence;
            } else if criteria.cost_converged(cost, trial_cost, step.predicted_reduction) {
                break ConvergenceStatus::FunctionValueConvergence;
            } else if trust_region.is_saturated() {
                break ConvergenceStatus::DampingLimitReached;
            }
        };

        debug!(
            "Levenberg-Marquardt finished after {} iterations ({} evaluations): {}",
            iterations,
            func_evals,
            status.description()
        );

        Ok(self.finish(params, residuals, cost, iterations, func_evals, status, jacobian))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        params: Array1<f64>,
        residuals: Array1<f64>,
        cost: f64,
        iterations: usize,
        func_evals: usize,
        status: ConvergenceStatus,
        jacobian: Array2<f64>,
    ) -> LmResult {
        LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            status,
            success: status.is_converged(),
            message: status.description(),
            jacobian,
        }
    }
}
