//! Rejected inputs and degenerate fits.

use crate::common::reference_spectrum;
use peakfit_rs::{FitSettings, PeakFitError, PeakFitter, Region};

#[test]
fn test_reversed_region() {
    match Region::new(120.0, 80.0) {
        Err(PeakFitError::InvalidRegion { low, high, .. }) => {
            assert_eq!((low, high), (120.0, 80.0));
        }
        other => panic!("expected InvalidRegion, got {:?}", other),
    }
    assert!(Region::new(80.0, f64::NAN).is_err());
}

#[test]
fn test_region_without_bins() {
    let histogram = reference_spectrum();
    let result = PeakFitter::default().fit(&histogram, Region::new(300.5, 310.0).unwrap(), &[]);
    assert!(matches!(result, Err(PeakFitError::EmptyRegion { .. })));

    // Between two bin centers
    let result = PeakFitter::default().fit(&histogram, Region::new(10.2, 10.8).unwrap(), &[]);
    assert!(matches!(result, Err(PeakFitError::EmptyRegion { .. })));
}

#[test]
fn test_no_guess_inside_region() {
    let histogram = reference_spectrum();
    let result = PeakFitter::default().fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[10.0, 150.0]);
    match result {
        Err(PeakFitError::NoPeaksInRegion { low, high }) => assert_eq!((low, high), (80.0, 120.0)),
        other => panic!("expected NoPeaksInRegion, got {:?}", other),
    }
}

#[test]
fn test_exactly_determined_fit_has_no_uncertainties() {
    let histogram = reference_spectrum();
    let result = PeakFitter::default()
        .fit(&histogram, Region::new(99.0, 101.0).unwrap(), &[100.0])
        .unwrap();

    assert_eq!(result.statistics.ndata, 3);
    assert_eq!(result.statistics.nvarys, 3);
    assert_eq!(result.statistics.redchi, None);
    let peak = &result.peaks[0];
    for value in [peak.amplitude, peak.center, peak.sigma, peak.fwhm, peak.area] {
        assert_eq!(value.uncertainty, 0.0);
    }
    assert!(result.correlations.is_empty());
}

#[test]
fn test_more_parameters_than_bins() {
    let histogram = reference_spectrum();
    let result = PeakFitter::default().fit(&histogram, Region::new(99.0, 101.0).unwrap(), &[99.5, 100.5]);
    match result {
        Err(PeakFitError::InsufficientData { points, parameters }) => {
            assert_eq!(points, 3);
            assert_eq!(parameters, 5);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_invalid_width_limits() {
    let histogram = reference_spectrum();
    let fitter = PeakFitter::new(FitSettings::default().with_width_limits(2.0, 1.0));
    let result = fitter.fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[100.0]);
    assert!(matches!(result, Err(PeakFitError::ParameterError(_))));
}
