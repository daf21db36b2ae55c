//! The Gaussian peak term of the composite model.
//!
//! A peak is `amplitude * exp(-(x - center)² / (2 * sigma²))`, so `amplitude`
//! is the height of the peak in counts. The Full Width at Half Maximum is
//! related to sigma by FWHM = 2 * sqrt(2 * ln(2)) * sigma ≈ 2.3548 * sigma.

use crate::parameters::Parameter;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Conversion factor from sigma to FWHM.
pub const FWHM_FACTOR: f64 = 2.3548;

/// Evaluate a single Gaussian term.
pub fn gaussian(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let arg = (x - center) / sigma;
    amplitude * (-0.5 * arg * arg).exp()
}

/// Integrated counts under a Gaussian of the given height and width.
pub fn gaussian_area(amplitude: f64, sigma: f64, bin_width: f64) -> f64 {
    amplitude * sigma * (2.0 * PI).sqrt() / bin_width
}

/// Width parameter of a peak: either its own, or borrowed from another peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Width {
    Owned(Parameter),
    SharesWidthOf(usize),
}

/// The parameters of one Gaussian term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakParameters {
    pub amplitude: Parameter,
    pub center: Parameter,
    pub width: Width,
}

impl PeakParameters {
    /// The owned width parameter, if this peak does not share one.
    pub fn own_width(&self) -> Option<&Parameter> {
        match &self.width {
            Width::Owned(param) => Some(param),
            Width::SharesWidthOf(_) => None,
        }
    }

    pub fn own_width_mut(&mut self) -> Option<&mut Parameter> {
        match &mut self.width {
            Width::Owned(param) => Some(param),
            Width::SharesWidthOf(_) => None,
        }
    }
}
