//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the bounded nonlinear least-squares solver used by the
//! peak fitter. Bounds are handled outside the solver, by mapping parameters
//! into an unbounded internal space (see [`crate::parameters::BoundsTransform`]).

pub mod algorithm;
pub mod config;
pub mod convergence;
pub mod step;
pub mod trust_region;

pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
pub use step::{LmStep, StepResult};
pub use trust_region::TrustRegion;
