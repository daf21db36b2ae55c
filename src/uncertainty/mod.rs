//! # Uncertainty Calculation
//!
//! This module provides functionality for calculating uncertainties in parameter
//! estimates from nonlinear least-squares optimization results:
//!
//! - Covariance matrix estimation from Jacobian matrices
//! - Standard errors and correlations for parameter estimates
//! - Linear propagation of the covariance into derived quantities such as
//!   FWHM and peak area
//!
//! The covariance is scaled by the reduced chi-square, in the manner of
//! lmfit-py. With no free degrees of freedom there is nothing to scale by and
//! no uncertainty is reported.

mod covariance;

pub use covariance::{calculate_correlation, calculate_covariance, standard_errors_from_covariance};

use ndarray::{Array1, Array2};

/// Calculator for parameter uncertainties.
#[derive(Debug, Clone)]
pub struct UncertaintyCalculator {
    /// Degrees of freedom (n_points - n_parameters)
    pub nfree: usize,
    /// Chi-square value at minimum
    pub chisqr: f64,
    /// Reduced chi-square (chi^2 / nfree), `NaN` when `nfree` is zero
    pub redchi: f64,
}

impl UncertaintyCalculator {
    /// Create a new UncertaintyCalculator
    pub fn new(ndata: usize, nvarys: usize, chisqr: f64) -> Self {
        let nfree = ndata.saturating_sub(nvarys);
        let redchi = if nfree > 0 {
            chisqr / nfree as f64
        } else {
            f64::NAN
        };

        Self {
            nfree,
            chisqr,
            redchi,
        }
    }

    /// Covariance of the varying parameters, if it can be estimated.
    pub fn covariance(&self, jacobian: &Array2<f64>) -> Option<Array2<f64>> {
        if self.nfree == 0 || !self.redchi.is_finite() {
            return None;
        }
        calculate_covariance(jacobian, self.redchi)
    }
}

/// Standard deviation of a derived quantity `f(p)` with gradient `∇f`:
/// `sqrt(∇fᵀ · C · ∇f)`.
pub fn propagate(gradient: &Array1<f64>, covar: &Array2<f64>) -> f64 {
    let variance = gradient.dot(&covar.dot(gradient));
    if variance > 0.0 && variance.is_finite() {
        variance.sqrt()
    } else {
        0.0
    }
}
