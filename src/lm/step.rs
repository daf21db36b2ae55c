//! Step calculation for the Levenberg-Marquardt algorithm.
//!
//! This module provides functionality for computing the Levenberg-Marquardt step,
//! which combines the Gauss-Newton and gradient descent steps.

use crate::error::{PeakFitError, Result};
use crate::lm::trust_region::TrustRegion;
use crate::utils::matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};
use ndarray::{Array1, Array2};

/// Floor for the diagonal scaling, so a parameter with a zero Jacobian column
/// still receives damping.
const MIN_DIAGONAL: f64 = 1e-12;

/// Result of a Levenberg-Marquardt step calculation.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// The calculated step vector
    pub step: Array1<f64>,

    /// The predicted reduction in cost function value
    pub predicted_reduction: f64,

    /// The damping parameter used to calculate the step
    pub lambda: f64,
}

/// Handles step calculation for the Levenberg-Marquardt algorithm.
pub struct LmStep;

impl LmStep {
    /// Calculates the Levenberg-Marquardt step.
    ///
    /// Solves `(JᵀJ + λ·D)·δ = -Jᵀr` with `D = diag(JᵀJ)` by Cholesky
    /// decomposition.
    ///
    /// # Errors
    ///
    /// `LinearAlgebraError` when the damped system is not positive definite or
    /// the solution is not finite. The caller is expected to increase lambda
    /// and retry.
    pub fn calculate_step(
        jacobian: &Array2<f64>,
        residuals: &Array1<f64>,
        trust_region: &TrustRegion,
    ) -> Result<StepResult> {
        if jacobian.nrows() != residuals.len() {
            return Err(PeakFitError::DimensionMismatch(format!(
                "Jacobian has {} rows but there are {} residuals",
                jacobian.nrows(),
                residuals.len()
            )));
        }

        let j_t_j = jacobian.t().dot(jacobian);
        let j_t_r = jacobian.t().dot(residuals);
        let diagonal: Array1<f64> = j_t_j.diag().mapv(|d| d.max(MIN_DIAGONAL));
        let lambda = trust_region.lambda;

        let mut augmented = ndarray_to_nalgebra(&j_t_j);
        for (i, d) in diagonal.iter().enumerate() {
            augmented[(i, i)] += lambda * d;
        }

        let rhs = -ndarray_vec_to_nalgebra(&j_t_r);
        let solution = augmented
            .cholesky()
            .ok_or_else(|| {
                PeakFitError::LinearAlgebraError(
                    "Damped normal equations are not positive definite".to_string(),
                )
            })?
            .solve(&rhs);

        let step = nalgebra_vec_to_ndarray(&solution);
        if step.iter().any(|s| !s.is_finite()) {
            return Err(PeakFitError::LinearAlgebraError(
                "Step contains non-finite values".to_string(),
            ));
        }

        let predicted_reduction = LmStep::predicted_reduction(&j_t_r, &diagonal, &step, lambda);

        Ok(StepResult {
            step,
            predicted_reduction,
            lambda,
        })
    }

    /// Reduction of the sum of squares predicted by the linearized model.
    ///
    /// For a step solving the damped system this equals
    /// `-gᵀδ + λ·Σ Dᵢᵢ·δᵢ²`, which is non-negative.
    fn predicted_reduction(
        j_t_r: &Array1<f64>,
        diagonal: &Array1<f64>,
        step: &Array1<f64>,
        lambda: f64,
    ) -> f64 {
        let damping: f64 = diagonal
            .iter()
            .zip(step.iter())
            .map(|(d, s)| d * s * s)
            .sum();
        -step.dot(j_t_r) + lambda * damping
    }
}
