//! Fits with several peaks in one region.

use crate::common::spectrum;
use approx::assert_relative_eq;
use peakfit_rs::{FitSettings, PeakFitter, Region};

#[test]
fn test_equal_widths_are_identical() {
    let histogram = spectrum(0.0, 200, |_| 10.0, &[(400.0, 70.0, 3.0), (250.0, 130.0, 3.0)]);
    let result = PeakFitter::default()
        .fit(&histogram, Region::new(50.0, 150.0).unwrap(), &[129.0, 71.0])
        .unwrap();

    assert!(result.statistics.success, "{}", result.statistics.message);
    assert_eq!(result.peaks.len(), 2);
    assert_eq!(result.peaks[0].sigma.value, result.peaks[1].sigma.value);
    assert_eq!(result.peaks[0].sigma.uncertainty, result.peaks[1].sigma.uncertainty);
    assert_relative_eq!(result.peaks[0].sigma.value, 3.0, max_relative = 0.01);

    // Sorted by guess
    assert_relative_eq!(result.peaks[0].center.value, 70.0, epsilon = 1e-3);
    assert_relative_eq!(result.peaks[1].center.value, 130.0, epsilon = 1e-3);
    assert_relative_eq!(result.peaks[0].amplitude.value, 400.0, max_relative = 0.01);
    assert_relative_eq!(result.peaks[1].amplitude.value, 250.0, max_relative = 0.01);

    // Two amplitudes, two centers, one shared width
    assert_eq!(result.statistics.nvarys, 5);
}

#[test]
fn test_independent_widths() {
    let histogram = spectrum(0.0, 200, |_| 10.0, &[(300.0, 70.0, 2.0), (200.0, 130.0, 4.0)]);
    let settings = FitSettings::default().with_equal_width(false);
    let result = PeakFitter::new(settings)
        .fit(&histogram, Region::new(50.0, 150.0).unwrap(), &[70.0, 130.0])
        .unwrap();

    assert!(result.statistics.success, "{}", result.statistics.message);
    assert_relative_eq!(result.peaks[0].sigma.value, 2.0, max_relative = 0.01);
    assert_relative_eq!(result.peaks[1].sigma.value, 4.0, max_relative = 0.01);
    assert_eq!(result.statistics.nvarys, 6);
}

#[test]
fn test_overlapping_peaks_keep_their_order() {
    let histogram = spectrum(0.0, 200, |_| 5.0, &[(300.0, 96.0, 3.0), (300.0, 104.0, 3.0)]);
    let result = PeakFitter::default()
        .fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[97.0, 103.0])
        .unwrap();

    let (left, right) = (result.peaks[0].center.value, result.peaks[1].center.value);
    assert!(left <= 100.0 && right >= 100.0);
    assert_relative_eq!(left, 96.0, epsilon = 1e-3);
    assert_relative_eq!(right, 104.0, epsilon = 1e-3);
}

#[test]
fn test_peaks_never_cross() {
    // Both guesses sit left of the only real peak; the first one can not
    // move past the midpoint between them.
    let histogram = spectrum(0.0, 200, |_| 5.0, &[(300.0, 100.0, 3.0)]);
    let settings = FitSettings::default().with_equal_width(false);
    let result = PeakFitter::new(settings)
        .fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[90.0, 93.0])
        .unwrap();

    let (left, right) = (result.peaks[0].center.value, result.peaks[1].center.value);
    assert!(left <= 91.5 + 1e-9, "first center {} crossed the midpoint", left);
    assert!(right >= 91.5 - 1e-9, "second center {} crossed the midpoint", right);
    assert!(right <= 120.0);
}

#[test]
fn test_guesses_outside_region_are_dropped() {
    let histogram = spectrum(0.0, 200, |_| 10.0, &[(400.0, 70.0, 3.0), (250.0, 130.0, 3.0)]);
    let result = PeakFitter::default()
        .fit(&histogram, Region::new(50.0, 100.0).unwrap(), &[130.0, 70.0, 10.0])
        .unwrap();

    assert_eq!(result.peaks.len(), 1);
    assert_relative_eq!(result.peaks[0].center.value, 70.0, epsilon = 1e-3);
}
