//! Fits of a single Gaussian peak.

use crate::common::{noisy_spectrum, reference_spectrum, spectrum};
use approx::assert_relative_eq;
use peakfit_rs::models::FWHM_FACTOR;
use peakfit_rs::{BackgroundModel, FitSettings, PeakFitter, Region};
use std::f64::consts::PI;

#[test]
fn test_recovers_reference_peak() {
    let histogram = reference_spectrum();
    let result = PeakFitter::default()
        .fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[101.0])
        .unwrap();

    assert!(result.statistics.success, "{}", result.statistics.message);
    assert_eq!(result.peaks.len(), 1);
    let peak = &result.peaks[0];
    assert_relative_eq!(peak.amplitude.value, 500.0, max_relative = 0.01);
    assert_relative_eq!(peak.center.value, 100.0, max_relative = 0.01);
    assert_relative_eq!(peak.sigma.value, 3.0, max_relative = 0.01);

    // Flat background from the side-bands
    let coefficients = &result.background.coefficients;
    assert_eq!(coefficients[0].name, "bg_slope");
    assert_relative_eq!(coefficients[0].value, 0.0, epsilon = 1e-6);
    assert_relative_eq!(coefficients[1].value, 10.0, max_relative = 1e-6);

    assert_eq!(result.statistics.ndata, 41);
    assert_eq!(result.statistics.nvarys, 3);
    assert_eq!(result.curve.len(), 5 * 41);
}

#[test]
fn test_derived_quantities_follow_fit() {
    let result = PeakFitter::default()
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[99.0])
        .unwrap();

    let peak = &result.peaks[0];
    assert_eq!(peak.fwhm.value, FWHM_FACTOR * peak.sigma.value);
    assert_eq!(
        peak.area.value,
        peak.amplitude.value * peak.sigma.value * (2.0 * PI).sqrt() / result.bin_width
    );
    // 500 * 3 * sqrt(2 pi)
    assert_relative_eq!(peak.area.value, 3759.9, max_relative = 0.01);
}

#[test]
fn test_no_guess_uses_maximum_bin() {
    let result = PeakFitter::default()
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[])
        .unwrap();

    assert_eq!(result.peaks.len(), 1);
    assert_relative_eq!(result.peaks[0].center.value, 100.0, epsilon = 1e-4);
}

#[test]
fn test_fixed_center_stays_at_guess() {
    let settings = FitSettings::default().with_free_position(false);
    let result = PeakFitter::new(settings)
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[100.4])
        .unwrap();

    let peak = &result.peaks[0];
    assert_eq!(peak.center.value, 100.4);
    assert_eq!(peak.center.uncertainty, 0.0);
    assert_eq!(result.statistics.nvarys, 2);
    // The other parameters still adapt around the offset center.
    assert!(peak.amplitude.value > 400.0);
}

#[test]
fn test_width_limits_are_respected() {
    let settings = FitSettings::default().with_width_limits(0.5, 2.0);
    let result = PeakFitter::new(settings)
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[100.0])
        .unwrap();

    let sigma = result.peaks[0].sigma.value;
    assert!(sigma <= 2.0 && sigma >= 0.5, "sigma {} outside limits", sigma);
}

#[test]
fn test_noisy_peak_within_uncertainties() {
    let truth = (500.0, 100.0, 3.0);
    let histogram = noisy_spectrum(0.0, 200, |_| 10.0, &[truth], 7);
    let result = PeakFitter::default()
        .fit(&histogram, Region::new(80.0, 120.0).unwrap(), &[101.0])
        .unwrap();

    assert!(result.statistics.success, "{}", result.statistics.message);
    let peak = &result.peaks[0];
    for (fitted, expected) in [
        (peak.amplitude, truth.0),
        (peak.center, truth.1),
        (peak.sigma, truth.2),
    ] {
        assert!(fitted.uncertainty > 0.0);
        assert!(
            (fitted.value - expected).abs() < 4.0 * fitted.uncertainty,
            "{} is not within 4 sigma of {}",
            fitted,
            expected
        );
    }
    assert!(peak.area.uncertainty > 0.0);
    assert_relative_eq!(peak.fwhm.uncertainty, FWHM_FACTOR * peak.sigma.uncertainty);
    assert!(result.statistics.redchi.unwrap() > 0.0);
}

#[test]
fn test_guess_on_region_edge_still_moves() {
    let histogram = spectrum(0.0, 200, |_| 0.0, &[(500.0, 100.0, 3.0)]);
    let settings = FitSettings::default().with_background(BackgroundModel::None);
    let result = PeakFitter::new(settings)
        .fit(&histogram, Region::new(97.0, 120.0).unwrap(), &[97.0])
        .unwrap();

    assert!(result.statistics.success, "{}", result.statistics.message);
    let peak = &result.peaks[0];
    assert_relative_eq!(peak.center.value, 100.0, epsilon = 1e-3);
    assert_relative_eq!(peak.amplitude.value, 500.0, max_relative = 1e-3);
}

#[test]
fn test_repeated_guesses_fit_one_peak() {
    let result = PeakFitter::default()
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[102.0, 102.0])
        .unwrap();

    assert_eq!(result.peaks.len(), 1);
    assert!(result.statistics.success, "{}", result.statistics.message);
    assert_relative_eq!(result.peaks[0].center.value, 100.0, epsilon = 1e-3);
    assert_relative_eq!(result.peaks[0].amplitude.value, 500.0, max_relative = 0.01);
}
