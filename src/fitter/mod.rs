//! The peak fitter: background pre-fit on side-bands, initial-value estimation,
//! and the joint fit of background plus Gaussian peaks.
//!
//! ```
//! use peakfit_rs::{FitSettings, Histogram, PeakFitter, Region};
//!
//! let centers: Vec<f64> = (0..200).map(|i| i as f64).collect();
//! let counts: Vec<f64> = centers
//!     .iter()
//!     .map(|x| 10.0 + 500.0 * (-(x - 100.0_f64).powi(2) / 18.0).exp())
//!     .collect();
//! let histogram = Histogram::new(centers, counts).unwrap();
//!
//! let fitter = PeakFitter::new(FitSettings::default());
//! let result = fitter
//!     .fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[101.0])
//!     .unwrap();
//! assert!((result.peaks[0].center.value - 100.0).abs() < 0.01);
//! ```

pub mod guess;
mod settings;

pub use settings::FitSettings;

use crate::error::{PeakFitError, Result};
use crate::histogram::{Histogram, Region, SideBand};
use crate::model::fit_model;
use crate::models::{BackgroundModel, PeakParameters, Width};
use crate::parameters::{FitParameters, Parameter};
use crate::result::FitResult;
use log::{debug, info, warn};
use ndarray::Array1;

/// Fits Gaussian peaks plus a background to a region of a histogram.
#[derive(Debug, Clone, Default)]
pub struct PeakFitter {
    settings: FitSettings,
}

impl PeakFitter {
    pub fn new(settings: FitSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FitSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut FitSettings {
        &mut self.settings
    }

    /// Fit `histogram` over `region` with one peak per guess inside the region.
    ///
    /// With no guesses at all, a single peak starts at the bin of maximum
    /// count in the region. Guesses are sorted and repeated guesses merged;
    /// the result lists peaks in ascending order of their guesses.
    ///
    /// # Errors
    ///
    /// - `EmptyRegion` when no bin lies in the region
    /// - `NoPeaksInRegion` when guesses were given but none is inside
    /// - `InsufficientData` when the region has fewer bins than varying
    ///   parameters
    /// - `ParameterError` for invalid settings
    ///
    /// A fit that does not converge is still returned, with zero uncertainties
    /// and `statistics.success == false`.
    pub fn fit(&self, histogram: &Histogram, region: Region, guesses: &[f64]) -> Result<FitResult> {
        self.settings.validate()?;
        let (x, y) = histogram.region_data(&region)?;
        let bin_width = histogram.bin_width();

        let centers = if guesses.is_empty() {
            guess::max_bin_center(&x, &y).into_iter().collect()
        } else {
            guess::centers_in_region(guesses, &region)
        };
        if centers.is_empty() {
            return Err(PeakFitError::NoPeaksInRegion {
                low: region.low(),
                high: region.high(),
            });
        }

        let background = self.prefit_background(histogram, &region, &x, &y)?;
        let heights: Array1<f64> = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| yi - background.evaluate(xi))
            .collect();

        let params = self.initial_parameters(background, &x, &heights, &centers, &region, bin_width)?;
        let nvarys = params.varying_count();
        if x.len() < nvarys {
            return Err(PeakFitError::InsufficientData {
                points: x.len(),
                parameters: nvarys,
            });
        }

        let fit = fit_model(&params, &x, &y, &self.settings.lm)?;
        if !fit.success() {
            warn!("peak fit did not converge: {}", fit.lm.message);
        }

        let result = FitResult::from_model_fit(
            &fit,
            region,
            bin_width,
            self.settings.curve_oversampling * x.len(),
        );
        info!("peak fit report:\n{}", result);
        Ok(result)
    }

    /// Fit the background alone on the side-bands.
    ///
    /// Unless `refit_background` is set, the fitted coefficients are frozen
    /// for the joint fit. When the side-bands hold too few bins the pre-fit is
    /// skipped and the coefficients stay free, starting from a guess over the
    /// whole region when guessing is enabled.
    fn prefit_background(
        &self,
        histogram: &Histogram,
        region: &Region,
        x: &Array1<f64>,
        y: &Array1<f64>,
    ) -> Result<BackgroundModel> {
        let mut background = self.settings.background.clone();
        background.normalize_names("bg_");

        let nvary = background.varying_count();
        if nvary == 0 {
            return Ok(background);
        }

        let bands: Vec<SideBand> = match &self.settings.side_bands {
            Some(bands) => bands.clone(),
            None => region.default_side_bands(histogram.bin_width()).to_vec(),
        };
        let (bx, by) = histogram.side_band_data(&bands);
        if bx.len() < nvary {
            warn!(
                "side-bands hold {} bins for {} background coefficients; skipping the background pre-fit",
                bx.len(),
                nvary
            );
            if self.settings.guess_background {
                background.guess(&x.to_vec(), &y.to_vec());
            }
            return Ok(background);
        }

        if self.settings.guess_background {
            let (xs, ys) = (bx.to_vec(), by.to_vec());
            if background.guess(&xs, &ys) {
                debug!(
                    "background guess from {} side-band bins: {:?}",
                    xs.len(),
                    background.coefficient_values()
                );
            }
        }

        let fit = fit_model(
            &FitParameters::background_only(background),
            &bx,
            &by,
            &self.settings.lm,
        )?;
        if !fit.success() {
            warn!("background pre-fit did not converge: {}", fit.lm.message);
        }
        debug!(
            "background pre-fit ({}): {:?}, chi-square {:.6e}",
            fit.params.background.kind(),
            fit.params.background.coefficient_values(),
            fit.chisqr
        );

        let mut background = fit.params.background;
        if !self.settings.refit_background {
            for coefficient in background.coefficients_mut() {
                coefficient.vary = false;
            }
        }
        Ok(background)
    }

    /// Assemble the composite model with starting values and bounds.
    fn initial_parameters(
        &self,
        background: BackgroundModel,
        x: &Array1<f64>,
        heights: &Array1<f64>,
        centers: &[f64],
        region: &Region,
        bin_width: f64,
    ) -> Result<FitParameters> {
        let tallest = guess::tallest_center(x, heights, centers).unwrap_or(centers[0]);
        let sigma = guess::estimate_sigma(x, heights, tallest, bin_width);
        let amplitudes = guess::amplitudes(x, heights, centers);
        let bounds = guess::center_bounds(centers, region);
        let (width_min, width_max) = self.settings.width_limits.unwrap_or((0.0, f64::INFINITY));

        debug!(
            "initial peaks: centers {:?}, amplitudes {:?}, sigma {:.4} (from peak at {})",
            centers, amplitudes, sigma, tallest
        );

        let mut peaks = Vec::with_capacity(centers.len());
        for (i, (&center, &amplitude)) in centers.iter().zip(amplitudes.iter()).enumerate() {
            let width = if self.settings.equal_width && i > 0 {
                Width::SharesWidthOf(0)
            } else {
                Width::Owned(Parameter::with_bounds(
                    &format!("g{}_sigma", i),
                    sigma,
                    width_min,
                    width_max,
                )?)
            };
            let (min, max) = bounds[i];
            let start = if self.settings.free_position {
                guess::start_inside(center, bounds[i])
            } else {
                center
            };
            let center = Parameter::with_bounds(&format!("g{}_center", i), start, min, max)?
                .varying(self.settings.free_position);

            peaks.push(PeakParameters {
                amplitude: Parameter::with_bounds(
                    &format!("g{}_amplitude", i),
                    amplitude,
                    0.0,
                    f64::INFINITY,
                )?,
                center,
                width,
            });
        }

        FitParameters::new(background, peaks)
    }
}
