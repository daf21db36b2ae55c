//! Model components for the composite fit: the background shapes and the
//! Gaussian peak term.

mod background;
mod peak;

pub use background::{BackgroundKind, BackgroundModel};
pub use peak::{gaussian, gaussian_area, PeakParameters, Width, FWHM_FACTOR};
