//! The outcome of a peak fit: values with uncertainties, fit statistics, the
//! display curve, and the fitted model for later re-evaluation.

use crate::error::{PeakFitError, Result};
use crate::histogram::Region;
use crate::lm::ConvergenceStatus;
use crate::model::ModelFit;
use crate::models::{gaussian, gaussian_area, BackgroundKind, FWHM_FACTOR};
use crate::parameters::{FitParameters, ParamSlot};
use crate::uncertainty::{calculate_correlation, propagate};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::Path;

/// Correlations at or below this magnitude are left out of the report.
const CORRELATION_THRESHOLD: f64 = 0.1;

/// A fitted quantity. The uncertainty is zero when it could not be estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub value: f64,
    pub uncertainty: f64,
}

impl Value {
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} ± {:.4}", self.value, self.uncertainty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakResult {
    /// Peak height in counts
    pub amplitude: Value,
    pub center: Value,
    pub sigma: Value,
    pub fwhm: Value,
    /// Integrated counts, `amplitude·sigma·√(2π)/bin_width`
    pub area: Value,
    /// Caller-assigned identifier
    pub uuid: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub value: f64,
    pub uncertainty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundResult {
    pub kind: BackgroundKind,
    pub coefficients: Vec<Coefficient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    pub chisqr: f64,
    /// `None` when there are no free degrees of freedom
    pub redchi: Option<f64>,
    pub ndata: usize,
    pub nvarys: usize,
    pub iterations: usize,
    pub func_evals: usize,
    pub success: bool,
    pub status: ConvergenceStatus,
    pub message: String,
}

/// A pair of varying parameters whose correlation exceeds the report threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub first: String,
    pub second: String,
    pub value: f64,
}

/// The separate contributions of a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct Components {
    pub background: Vec<f64>,
    /// One curve per peak, in peak order
    pub peaks: Vec<Vec<f64>>,
}

/// Result of [`crate::PeakFitter::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Peaks in ascending order of their initial centers
    pub peaks: Vec<PeakResult>,
    pub background: BackgroundResult,
    /// Dense `(x, y)` samples of the composite model across the region
    pub curve: Vec<[f64; 2]>,
    pub statistics: FitStatistics,
    pub region: Region,
    pub bin_width: f64,
    pub correlations: Vec<Correlation>,
    /// The fitted model, used to re-evaluate a reloaded result
    pub model: FitParameters,
}

impl FitResult {
    /// Collect peak values, derived quantities and statistics from a joint fit.
    pub(crate) fn from_model_fit(
        fit: &ModelFit,
        region: Region,
        bin_width: f64,
        curve_points: usize,
    ) -> Self {
        let model = &fit.params;
        let covariance = if fit.success() {
            fit.covariance.as_ref()
        } else {
            None
        };
        let slots = model.varying_slots();
        let index_of = |slot: Option<ParamSlot>| slot.and_then(|s| slots.iter().position(|&v| v == s));

        let stderr = |slot: Option<ParamSlot>| -> f64 {
            match (covariance, index_of(slot)) {
                (Some(covar), Some(i)) if covar[[i, i]] > 0.0 => covar[[i, i]].sqrt(),
                _ => 0.0,
            }
        };

        let peaks = (0..model.peaks.len())
            .map(|i| {
                let amplitude_slot = Some(ParamSlot::Amplitude(i));
                let width_slot = model.width_slot(i);
                let amplitude = model.peaks[i].amplitude.value();
                let sigma = model.width_of(i);
                let sigma_err = stderr(width_slot);

                let area_err = covariance
                    .map(|covar| {
                        let mut gradient = Array1::zeros(slots.len());
                        if let Some(a) = index_of(amplitude_slot) {
                            gradient[a] = sigma * (2.0 * PI).sqrt() / bin_width;
                        }
                        if let Some(s) = index_of(width_slot) {
                            gradient[s] = amplitude * (2.0 * PI).sqrt() / bin_width;
                        }
                        propagate(&gradient, covar)
                    })
                    .unwrap_or(0.0);

                PeakResult {
                    amplitude: Value::new(amplitude, stderr(amplitude_slot)),
                    center: Value::new(
                        model.peaks[i].center.value(),
                        stderr(Some(ParamSlot::Center(i))),
                    ),
                    sigma: Value::new(sigma, sigma_err),
                    fwhm: Value::new(FWHM_FACTOR * sigma, FWHM_FACTOR * sigma_err),
                    area: Value::new(gaussian_area(amplitude, sigma, bin_width), area_err),
                    uuid: None,
                }
            })
            .collect();

        let coefficients = model
            .background
            .coefficients()
            .into_iter()
            .enumerate()
            .map(|(i, param)| {
                let slot = Some(ParamSlot::Background(i));
                let uncertainty = if !fit.success() {
                    0.0
                } else if param.vary {
                    stderr(slot)
                } else {
                    // Frozen after the side-band pre-fit
                    param.stderr.unwrap_or(0.0)
                };
                Coefficient {
                    name: param.name.clone(),
                    value: param.value(),
                    uncertainty,
                }
            })
            .collect();

        let correlations = covariance
            .map(|covar| correlations(model, &slots, covar))
            .unwrap_or_default();

        let mut result = Self {
            peaks,
            background: BackgroundResult {
                kind: model.background.kind(),
                coefficients,
            },
            curve: Vec::new(),
            statistics: FitStatistics {
                chisqr: fit.chisqr,
                redchi: fit.redchi.is_finite().then_some(fit.redchi),
                ndata: fit.ndata,
                nvarys: fit.nvarys,
                iterations: fit.lm.iterations,
                func_evals: fit.lm.func_evals,
                success: fit.success(),
                status: fit.lm.status,
                message: fit.lm.message.clone(),
            },
            region,
            bin_width,
            correlations,
            model: model.clone(),
        };
        result.regenerate_curve(curve_points);
        result
    }

    /// Composite model at each `x`.
    pub fn eval(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&x| self.model.evaluate(x)).collect()
    }

    /// Background and each peak separately at each `x`.
    pub fn eval_components(&self, x: &[f64]) -> Components {
        let background = x.iter().map(|&x| self.model.background.evaluate(x)).collect();
        let peaks = self
            .peaks
            .iter()
            .map(|peak| {
                x.iter()
                    .map(|&x| gaussian(x, peak.amplitude.value, peak.center.value, peak.sigma.value))
                    .collect()
            })
            .collect();
        Components { background, peaks }
    }

    /// Resample the display curve with `points` evenly spaced samples across
    /// the region, edges included.
    pub fn regenerate_curve(&mut self, points: usize) {
        let x = Array1::linspace(self.region.low(), self.region.high(), points.max(2));
        let y = self.eval(&x.to_vec());
        self.curve = x.iter().zip(y).map(|(&x, y)| [x, y]).collect();
    }

    /// Attach a caller identifier to a peak.
    pub fn set_peak_uuid(&mut self, index: usize, uuid: u64) -> Result<()> {
        let count = self.peaks.len();
        let peak = self
            .peaks
            .get_mut(index)
            .ok_or(PeakFitError::PeakIndexOutOfRange { index, count })?;
        peak.uuid = Some(uuid);
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Human-readable summary in the style of an lmfit fit report.
    pub fn fit_report(&self) -> String {
        self.to_string()
    }
}

fn correlations(model: &FitParameters, slots: &[ParamSlot], covar: &Array2<f64>) -> Vec<Correlation> {
    let correl = calculate_correlation(covar);
    let mut pairs = Vec::new();
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            let value = correl[[i, j]];
            if value.abs() > CORRELATION_THRESHOLD {
                pairs.push(Correlation {
                    first: model.name_of(slots[i]),
                    second: model.name_of(slots[j]),
                    value,
                });
            }
        }
    }
    pairs.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    pairs
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;
        writeln!(f, "[[Fit Statistics]]")?;
        writeln!(f, "    region             = [{}, {}]", self.region.low(), self.region.high())?;
        writeln!(f, "    # function evals   = {}", stats.func_evals)?;
        writeln!(f, "    # iterations       = {}", stats.iterations)?;
        writeln!(f, "    # data points      = {}", stats.ndata)?;
        writeln!(f, "    # variables        = {}", stats.nvarys)?;
        writeln!(f, "    chi-square         = {:.6e}", stats.chisqr)?;
        match stats.redchi {
            Some(redchi) => writeln!(f, "    reduced chi-square = {:.6e}", redchi)?,
            None => writeln!(f, "    reduced chi-square = n/a")?,
        }
        writeln!(f, "    status             = {}", stats.message)?;

        writeln!(f, "[[Background: {}]]", self.background.kind)?;
        for c in &self.background.coefficients {
            writeln!(f, "    {:<14} = {:.6} ± {:.6}", c.name, c.value, c.uncertainty)?;
        }

        writeln!(f, "[[Peaks]]")?;
        for (i, peak) in self.peaks.iter().enumerate() {
            write!(f, "    g{}", i)?;
            if let Some(uuid) = peak.uuid {
                write!(f, " (uuid {})", uuid)?;
            }
            writeln!(f)?;
            writeln!(f, "        amplitude = {}", peak.amplitude)?;
            writeln!(f, "        center    = {}", peak.center)?;
            writeln!(f, "        sigma     = {}", peak.sigma)?;
            writeln!(f, "        fwhm      = {}", peak.fwhm)?;
            writeln!(f, "        area      = {}", peak.area)?;
        }

        if !self.correlations.is_empty() {
            writeln!(f, "[[Correlations]] (unreported correlations are < {:.3})", CORRELATION_THRESHOLD)?;
            for c in &self.correlations {
                writeln!(f, "    C({}, {}) = {:+.4}", c.first, c.second, c.value)?;
            }
        }
        Ok(())
    }
}
