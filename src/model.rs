//! Adapting a composite model to the optimizer.
//!
//! [`ModelProblem`] turns a [`FitParameters`] template plus data into a
//! [`Problem`] whose unknowns are the varying parameters. [`fit_model`] runs the
//! optimizer on it and estimates the covariance of the result.

use crate::error::{PeakFitError, Result};
use crate::lm::{LevenbergMarquardt, LmConfig, LmResult};
use crate::parameters::FitParameters;
use crate::problem::Problem;
use crate::uncertainty::{standard_errors_from_covariance, UncertaintyCalculator};
use log::{debug, warn};
use ndarray::{Array1, Array2};

/// Which coordinates the problem's parameter vector is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSpace {
    /// Unbounded optimizer coordinates, mapped through the bounds transform
    Internal,
    /// Physical parameter values, as used for the covariance
    External,
}

/// Residuals `model(x) - y` of a composite model over fixed data.
pub struct ModelProblem<'a> {
    template: &'a FitParameters,
    x_data: &'a Array1<f64>,
    y_data: &'a Array1<f64>,
    space: ParameterSpace,
    n_varying: usize,
}

impl<'a> ModelProblem<'a> {
    /// Create a problem over `x_data`/`y_data`.
    ///
    /// The template supplies the model shape, the fixed values and the bounds;
    /// only its varying parameters are unknowns.
    pub fn new(
        template: &'a FitParameters,
        x_data: &'a Array1<f64>,
        y_data: &'a Array1<f64>,
        space: ParameterSpace,
    ) -> Result<Self> {
        if x_data.len() != y_data.len() {
            return Err(PeakFitError::DimensionMismatch(format!(
                "Expected x and y data to have the same length, got {} and {}",
                x_data.len(),
                y_data.len()
            )));
        }
        Ok(Self {
            template,
            x_data,
            y_data,
            space,
            n_varying: template.varying_count(),
        })
    }

    pub fn x_data(&self) -> &Array1<f64> {
        self.x_data
    }

    pub fn y_data(&self) -> &Array1<f64> {
        self.y_data
    }

    /// The template with `params` applied.
    pub fn parameters_at(&self, params: &Array1<f64>) -> Result<FitParameters> {
        let mut values = self.template.clone();
        match self.space {
            ParameterSpace::Internal => values.set_from_internal(params)?,
            ParameterSpace::External => values.set_external_unclamped(params)?,
        }
        Ok(values)
    }
}

impl Problem for ModelProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let values = self.parameters_at(params)?;
        Ok(self
            .x_data
            .iter()
            .zip(self.y_data.iter())
            .map(|(&x, &y)| values.evaluate(x) - y)
            .collect())
    }

    fn parameter_count(&self) -> usize {
        self.n_varying
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }
}

/// Outcome of fitting a [`FitParameters`] model to data.
#[derive(Debug, Clone)]
pub struct ModelFit {
    /// Best-fit parameters, with `stderr` set when a covariance exists
    pub params: FitParameters,
    /// The raw optimizer result, in internal coordinates
    pub lm: LmResult,
    /// Covariance of the varying parameters in physical units
    pub covariance: Option<Array2<f64>>,
    pub ndata: usize,
    pub nvarys: usize,
    pub chisqr: f64,
    /// `chisqr / (ndata - nvarys)`, `NaN` without free degrees of freedom
    pub redchi: f64,
}

impl ModelFit {
    pub fn success(&self) -> bool {
        self.lm.success
    }

    pub fn nfree(&self) -> usize {
        self.ndata.saturating_sub(self.nvarys)
    }
}

/// Fit `params` to `(x, y)` and estimate parameter uncertainties.
///
/// The covariance is only estimated for a converged fit with more points than
/// varying parameters and a non-singular `JᵀJ`; otherwise the `stderr` of
/// every varying parameter is `None`.
pub fn fit_model(
    params: &FitParameters,
    x: &Array1<f64>,
    y: &Array1<f64>,
    config: &LmConfig,
) -> Result<ModelFit> {
    let problem = ModelProblem::new(params, x, y, ParameterSpace::Internal)?;
    let initial = params.to_internal()?;
    let lm = LevenbergMarquardt::with_config(config.clone()).minimize(&problem, initial)?;

    let mut fitted = problem.parameters_at(&lm.params)?;
    let ndata = x.len();
    let nvarys = fitted.varying_count();
    let calculator = UncertaintyCalculator::new(ndata, nvarys, lm.cost);

    let covariance = if lm.success && nvarys > 0 {
        external_covariance(&fitted, x, y, &calculator)?
    } else {
        None
    };

    // Fixed parameters keep whatever stderr they came in with.
    for slot in fitted.varying_slots() {
        if let Some(param) = fitted.get_mut(slot) {
            param.stderr = None;
        }
    }
    match &covariance {
        Some(covar) => {
            let errors = standard_errors_from_covariance(covar);
            for (slot, error) in fitted.varying_slots().into_iter().zip(errors.iter()) {
                if let Some(param) = fitted.get_mut(slot) {
                    param.stderr = Some(*error);
                }
            }
        }
        None if !lm.success => {
            warn!("fit did not converge ({}); uncertainties unavailable", lm.message)
        }
        None if nvarys > 0 => debug!(
            "no covariance for {} points and {} varying parameters",
            ndata, nvarys
        ),
        None => {}
    }

    Ok(ModelFit {
        params: fitted,
        covariance,
        ndata,
        nvarys,
        chisqr: lm.cost,
        redchi: calculator.redchi,
        lm,
    })
}

/// Covariance in physical units from a Jacobian taken at the best-fit values.
fn external_covariance(
    fitted: &FitParameters,
    x: &Array1<f64>,
    y: &Array1<f64>,
    calculator: &UncertaintyCalculator,
) -> Result<Option<Array2<f64>>> {
    if calculator.nfree == 0 {
        return Ok(None);
    }
    let problem = ModelProblem::new(fitted, x, y, ParameterSpace::External)?;
    let jacobian = problem.jacobian(&fitted.to_external())?;
    Ok(calculator.covariance(&jacobian))
}
