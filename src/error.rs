use thiserror::Error;

use crate::parameters::BoundsError;

/// Error types for the peakfit-rs library.
#[derive(Error, Debug)]
pub enum PeakFitError {
    /// The histogram does not describe uniformly binned data.
    #[error("Invalid histogram: {0}")]
    InvalidHistogram(String),

    /// The fit region is reversed, empty or not finite.
    #[error("Invalid region [{low}, {high}]: {reason}")]
    InvalidRegion { low: f64, high: f64, reason: String },

    /// No histogram bin lies inside the fit region.
    #[error("Region [{low}, {high}] contains no bins")]
    EmptyRegion { low: f64, high: f64 },

    /// Every peak guess was filtered out by the region.
    #[error("No peak guesses lie inside the region [{low}, {high}]")]
    NoPeaksInRegion { low: f64, high: f64 },

    /// The region holds fewer data points than parameters to fit.
    #[error("Not enough data: {points} points for {parameters} varying parameters")]
    InsufficientData { points: usize, parameters: usize },

    /// A background model name that does not match any variant.
    #[error("Unsupported background model '{0}' (expected one of: none, linear, quadratic, exponential, powerlaw)")]
    UnsupportedBackground(String),

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error during function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// Linear algebra error.
    #[error("Linear algebra error: {0}")]
    LinearAlgebraError(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error for boundary constraint violations.
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    /// Peak index outside the fitted peaks.
    #[error("Peak index {index} out of range for {count} peaks")]
    PeakIndexOutOfRange { index: usize, count: usize },

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for peakfit-rs operations.
pub type Result<T> = std::result::Result<T, PeakFitError>;
