//! Options controlling a peak fit.

use crate::error::{PeakFitError, Result};
use crate::histogram::SideBand;
use crate::lm::LmConfig;
use crate::models::BackgroundModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for [`crate::PeakFitter`].
///
/// Missing fields in a JSON file fall back to [`FitSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    /// All peaks share the width of the first peak
    pub equal_width: bool,

    /// Peak centers are fitted; when false they stay at the guesses
    pub free_position: bool,

    /// Background shape and the initial value, bounds and vary flag of each
    /// coefficient
    pub background: BackgroundModel,

    /// Ranges used to pre-fit the background. `None` means one bin-width
    /// outside each region edge.
    pub side_bands: Option<Vec<SideBand>>,

    /// Keep the pre-fitted background free in the joint fit
    pub refit_background: bool,

    /// Seed the background pre-fit with a closed-form estimate
    pub guess_background: bool,

    /// `(min, max)` for every peak width; `None` means `[0, ∞)`
    pub width_limits: Option<(f64, f64)>,

    /// Points in the display curve per data point in the region
    pub curve_oversampling: usize,

    /// Solver options
    pub lm: LmConfig,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            equal_width: true,
            free_position: true,
            background: BackgroundModel::default(),
            side_bands: None,
            refit_background: false,
            guess_background: true,
            width_limits: None,
            curve_oversampling: 5,
            lm: LmConfig::default(),
        }
    }
}

impl FitSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equal_width(mut self, equal_width: bool) -> Self {
        self.equal_width = equal_width;
        self
    }

    pub fn with_free_position(mut self, free_position: bool) -> Self {
        self.free_position = free_position;
        self
    }

    pub fn with_background(mut self, background: BackgroundModel) -> Self {
        self.background = background;
        self
    }

    pub fn with_side_bands(mut self, side_bands: Vec<SideBand>) -> Self {
        self.side_bands = Some(side_bands);
        self
    }

    pub fn with_refit_background(mut self, refit: bool) -> Self {
        self.refit_background = refit;
        self
    }

    pub fn with_guess_background(mut self, guess: bool) -> Self {
        self.guess_background = guess;
        self
    }

    pub fn with_width_limits(mut self, min: f64, max: f64) -> Self {
        self.width_limits = Some((min, max));
        self
    }

    pub fn with_curve_oversampling(mut self, factor: usize) -> Self {
        self.curve_oversampling = factor;
        self
    }

    pub fn with_lm_config(mut self, lm: LmConfig) -> Self {
        self.lm = lm;
        self
    }

    /// Check the settings before any data is touched.
    pub fn validate(&self) -> Result<()> {
        if let Some((min, max)) = self.width_limits {
            if !(min >= 0.0 && min < max) {
                return Err(PeakFitError::ParameterError(format!(
                    "width limits must satisfy 0 <= min < max, got ({}, {})",
                    min, max
                )));
            }
        }
        if let Some(bands) = &self.side_bands {
            if bands.is_empty() {
                return Err(PeakFitError::ParameterError(
                    "side_bands must hold at least one range".to_string(),
                ));
            }
        }
        if self.curve_oversampling == 0 {
            return Err(PeakFitError::ParameterError(
                "curve_oversampling must be at least 1".to_string(),
            ));
        }
        self.lm.validate()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
