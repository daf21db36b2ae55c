//! # Parameter System
//!
//! Named parameters with bounds and a vary flag, and the typed parameter set
//! of the composite peak model.
//!
//! - [`Parameter`]: a value with bounds, vary flag and standard error
//! - [`Bounds`] and [`BoundsTransform`]: bounds enforced through a change of
//!   variables during optimization
//! - [`FitParameters`] and [`ParamSlot`]: background coefficients plus one
//!   block per peak, with widths that are either owned or shared
//!
//! ```rust
//! use peakfit_rs::models::{BackgroundKind, BackgroundModel, PeakParameters, Width};
//! use peakfit_rs::parameters::{FitParameters, Parameter};
//!
//! let peak = |i: usize, center: f64, width: Width| PeakParameters {
//!     amplitude: Parameter::with_bounds(&format!("g{}_amplitude", i), 10.0, 0.0, f64::INFINITY).unwrap(),
//!     center: Parameter::new(&format!("g{}_center", i), center),
//!     width,
//! };
//!
//! let params = FitParameters::new(
//!     BackgroundModel::from(BackgroundKind::None),
//!     vec![
//!         peak(0, 10.0, Width::Owned(Parameter::new("g0_sigma", 2.0))),
//!         peak(1, 20.0, Width::SharesWidthOf(0)),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(params.width_of(1), 2.0);
//! assert_eq!(params.varying_count(), 5);
//! ```

pub mod bounds;
pub mod parameter;
pub mod parameters;


pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use parameter::Parameter;
pub use parameters::{FitParameters, ParamSlot};
