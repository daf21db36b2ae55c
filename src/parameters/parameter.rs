//! A single fit parameter: value, bounds, vary flag and standard error.

use crate::parameters::bounds::{Bounds, BoundsError, BoundsTransform};
use serde::{Deserialize, Serialize};

/// A parameter for the peak fit.
///
/// Mirrors what a caller specifies for a background coefficient:
/// initial value, lower bound, upper bound and whether it varies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name used in fit reports, e.g. `bg_slope` or `g0_center`
    pub name: String,

    value: f64,

    /// Whether this parameter can be varied during optimization
    pub vary: bool,

    bounds: Bounds,

    /// Standard error of the parameter (set after fitting)
    pub stderr: Option<f64>,
}

impl Parameter {
    /// Create an unbounded, varying parameter.
    ///
    /// ```
    /// use peakfit_rs::parameters::Parameter;
    ///
    /// let param = Parameter::new("bg_slope", 1.0);
    /// assert_eq!(param.value(), 1.0);
    /// assert!(param.vary);
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            vary: true,
            bounds: Bounds::default(),
            stderr: None,
        }
    }

    /// Create a varying parameter with bounds. The value is clamped into them.
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, BoundsError> {
        let bounds = Bounds::new(min, max)?;
        Ok(Self {
            name: name.to_string(),
            value: bounds.clamp(value),
            vary: true,
            bounds,
            stderr: None,
        })
    }

    /// Create a parameter that is held at `value`.
    pub fn fixed(name: &str, value: f64) -> Self {
        Self {
            vary: false,
            ..Self::new(name, value)
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, clamped into the current bounds.
    pub fn set_value(&mut self, value: f64) {
        self.value = self.bounds.clamp(value);
    }

    /// Set the value without clamping into the bounds.
    pub(crate) fn set_value_unclamped(&mut self, value: f64) {
        self.value = value;
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    /// Replace the bounds and clamp the value into them.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<(), BoundsError> {
        self.bounds = Bounds::new(min, max)?;
        self.value = self.bounds.clamp(self.value);
        Ok(())
    }

    /// Builder-style variant of setting `vary`.
    pub fn varying(mut self, vary: bool) -> Self {
        self.vary = vary;
        self
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn to_internal(&self) -> Result<f64, BoundsError> {
        BoundsTransform::new(self.bounds).to_internal(self.value)
    }

    pub fn set_from_internal(&mut self, internal: f64) {
        self.value = BoundsTransform::new(self.bounds).to_external(internal);
    }
}
