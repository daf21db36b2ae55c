//! # peakfit-rs
//!
//! `peakfit-rs` fits sums of Gaussian peaks plus a background model to 1D
//! energy histograms, as used in nuclear-physics spectroscopy.
//!
//! The library provides:
//! - Validated, uniformly binned [`Histogram`]s with fit [`Region`]s and
//!   background [`SideBand`]s
//! - Background models (none, linear, quadratic, exponential, power-law)
//! - A [`PeakFitter`] that pre-fits the background on side-bands, estimates
//!   starting values, and fits all peaks jointly with shared or independent
//!   widths and fixed or free centers
//! - A bounded Levenberg-Marquardt solver with covariance-based uncertainties
//! - [`FitResult`]s with derived FWHM and area, a fit report, and JSON
//!   persistence
//!
//! ## Basic Usage
//!
//! ```
//! use peakfit_rs::{BackgroundKind, BackgroundModel, FitSettings, Histogram, PeakFitter, Region};
//!
//! let centers: Vec<f64> = (0..100).map(|i| i as f64).collect();
//! let counts: Vec<f64> = centers
//!     .iter()
//!     .map(|x| 300.0 * (-(x - 50.0_f64).powi(2) / 8.0).exp())
//!     .collect();
//! let histogram = Histogram::new(centers, counts).unwrap();
//!
//! let settings = FitSettings::default().with_background(BackgroundModel::from(BackgroundKind::None));
//! let result = PeakFitter::new(settings)
//!     .fit(&histogram, Region::new(35.0, 65.0).unwrap(), &[])
//!     .unwrap();
//!
//! let peak = &result.peaks[0];
//! assert!((peak.sigma.value - 2.0).abs() < 1e-3);
//! println!("{}", result.fit_report());
//! ```

pub mod error;
pub mod fitter;
pub mod histogram;
pub mod lm;
pub mod model;
pub mod models;
pub mod parameters;
pub mod problem;
pub mod result;
pub mod uncertainty;
pub mod utils;

// Re-exports for convenience
pub use error::{PeakFitError, Result};
pub use fitter::{FitSettings, PeakFitter};
pub use histogram::{Histogram, Region, SideBand};
pub use lm::{LevenbergMarquardt, LmConfig};
pub use models::{BackgroundKind, BackgroundModel};
pub use parameters::{FitParameters, Parameter};
pub use problem::Problem;
pub use result::{FitResult, PeakResult, Value};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
