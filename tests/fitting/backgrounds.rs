//! The background models inside a full peak fit.

use crate::common::spectrum;
use approx::assert_relative_eq;
use peakfit_rs::{
    BackgroundKind, BackgroundModel, FitSettings, Histogram, Parameter, PeakFitError, PeakFitter,
    Region, SideBand,
};

const PEAK: (f64, f64, f64) = (300.0, 100.0, 3.0);

fn fit_with(histogram: &Histogram, settings: FitSettings, low: f64, high: f64) -> peakfit_rs::FitResult {
    PeakFitter::new(settings)
        .fit(histogram, Region::new(low, high).unwrap(), &[101.0])
        .unwrap()
}

fn assert_peak_recovered(result: &peakfit_rs::FitResult) {
    assert!(result.statistics.success, "{}", result.statistics.message);
    let peak = &result.peaks[0];
    assert_relative_eq!(peak.amplitude.value, PEAK.0, max_relative = 0.01);
    assert_relative_eq!(peak.center.value, PEAK.1, max_relative = 0.001);
    assert_relative_eq!(peak.sigma.value, PEAK.2, max_relative = 0.01);
}

#[test]
fn test_none_matches_fixed_zero_background() {
    let histogram = spectrum(0.0, 200, |_| 0.0, &[PEAK]);

    let none = fit_with(
        &histogram,
        FitSettings::default().with_background(BackgroundModel::from(BackgroundKind::None)),
        80.0,
        120.0,
    );
    let zero = fit_with(
        &histogram,
        FitSettings::default().with_background(BackgroundModel::Linear {
            slope: Parameter::fixed("bg_slope", 0.0),
            intercept: Parameter::fixed("bg_intercept", 0.0),
        }),
        80.0,
        120.0,
    );

    assert!(none.background.coefficients.is_empty());
    assert_eq!(none.peaks, zero.peaks);
    assert_eq!(none.statistics.chisqr, zero.statistics.chisqr);
    assert_eq!(none.statistics.nvarys, zero.statistics.nvarys);
    assert_eq!(none.curve, zero.curve);
}

#[test]
fn test_bins_outside_region_do_not_matter() {
    let clean = spectrum(0.0, 200, |_| 10.0, &[PEAK]);
    let mut counts = clean.counts().to_vec();
    counts[10] += 1000.0;
    counts[79] = 0.0;
    counts[150] += 50.0;
    let perturbed = Histogram::new(clean.centers().to_vec(), counts).unwrap();

    // Without a background, and with side-bands inside the region
    let settings = [
        FitSettings::default().with_background(BackgroundModel::None),
        FitSettings::default()
            .with_side_bands(vec![SideBand::new(80.0, 85.0), SideBand::new(115.0, 120.0)]),
    ];
    for settings in settings {
        let a = fit_with(&clean, settings.clone(), 80.0, 120.0);
        let b = fit_with(&perturbed, settings, 80.0, 120.0);
        assert_eq!(a, b);
    }
}

#[test]
fn test_quadratic_background() {
    let background = |x: f64| 0.002 * x * x - 0.3 * x + 30.0;
    let histogram = spectrum(0.0, 200, background, &[PEAK]);
    let settings = FitSettings::default()
        .with_background(BackgroundModel::from(BackgroundKind::Quadratic))
        .with_side_bands(vec![SideBand::new(60.0, 80.0), SideBand::new(120.0, 140.0)]);

    let result = fit_with(&histogram, settings, 60.0, 140.0);
    assert_peak_recovered(&result);
    let values: Vec<f64> = result.background.coefficients.iter().map(|c| c.value).collect();
    assert_relative_eq!(values[0], 0.002, max_relative = 1e-3);
    assert_relative_eq!(values[1], -0.3, max_relative = 1e-3);
    assert_relative_eq!(values[2], 30.0, max_relative = 1e-3);
}

#[test]
fn test_exponential_background() {
    let background = |x: f64| 200.0 * (-x / 80.0).exp();
    let histogram = spectrum(0.0, 200, background, &[PEAK]);
    let settings = FitSettings::default()
        .with_background("exponential".parse().unwrap())
        .with_side_bands(vec![SideBand::new(60.0, 85.0), SideBand::new(115.0, 140.0)]);

    let result = fit_with(&histogram, settings, 60.0, 140.0);
    assert_peak_recovered(&result);
    assert_eq!(result.background.coefficients[1].name, "bg_decay");
    assert_relative_eq!(result.background.coefficients[1].value, 80.0, max_relative = 1e-3);
}

#[test]
fn test_power_law_background() {
    let background = |x: f64| 5.0e4 * x.powf(-1.5);
    let histogram = spectrum(1.0, 200, background, &[PEAK]);
    let settings = FitSettings::default()
        .with_background("power-law".parse().unwrap())
        .with_side_bands(vec![SideBand::new(60.0, 85.0), SideBand::new(115.0, 140.0)]);

    let result = fit_with(&histogram, settings, 60.0, 140.0);
    assert_peak_recovered(&result);
    assert_relative_eq!(result.background.coefficients[1].value, -1.5, max_relative = 1e-3);
}

#[test]
fn test_refit_background_frees_coefficients() {
    let histogram = spectrum(0.0, 200, |x| 0.05 * x + 4.0, &[PEAK]);
    let settings = FitSettings::default().with_refit_background(true);
    let result = fit_with(&histogram, settings, 80.0, 120.0);

    assert_peak_recovered(&result);
    assert_eq!(result.statistics.nvarys, 5);
    assert_relative_eq!(result.background.coefficients[0].value, 0.05, max_relative = 1e-3);
}

#[test]
fn test_sparse_side_bands_skip_the_pre_fit() {
    let histogram = spectrum(0.0, 200, |_| 10.0, &[PEAK]);
    // No bin center lies inside this band.
    let settings = FitSettings::default().with_side_bands(vec![SideBand::new(10.2, 10.4)]);
    let result = fit_with(&histogram, settings, 70.0, 130.0);

    // The background stays free in the joint fit.
    assert_eq!(result.statistics.nvarys, 5);
    assert_peak_recovered(&result);
    assert_relative_eq!(result.background.coefficients[1].value, 10.0, max_relative = 1e-3);
}

#[test]
fn test_caller_coefficients_are_honoured() {
    let histogram = spectrum(0.0, 200, |_| 10.0, &[PEAK]);
    let settings = FitSettings::default().with_background(BackgroundModel::Linear {
        slope: Parameter::fixed("slope", 0.0),
        intercept: Parameter::new("intercept", 1.0),
    });
    let result = fit_with(&histogram, settings, 80.0, 120.0);

    let coefficients = &result.background.coefficients;
    assert_eq!(coefficients[0].name, "bg_slope");
    assert_eq!(coefficients[0].value, 0.0);
    assert_relative_eq!(coefficients[1].value, 10.0, max_relative = 1e-6);
}

#[test]
fn test_unknown_background_name() {
    match "cubic".parse::<BackgroundModel>() {
        Err(PeakFitError::UnsupportedBackground(name)) => assert_eq!(name, "cubic"),
        other => panic!("expected UnsupportedBackground, got {:?}", other),
    }
}
