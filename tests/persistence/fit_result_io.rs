//! Saving, reloading and re-evaluating fit results.

use crate::common::{reference_spectrum, spectrum};
use approx::assert_relative_eq;
use peakfit_rs::{FitResult, FitSettings, PeakFitError, PeakFitter, Region};
use tempfile::tempdir;

fn two_peak_result() -> FitResult {
    let histogram = spectrum(0.0, 200, |x| 0.02 * x + 8.0, &[(400.0, 70.0, 3.0), (250.0, 82.0, 3.0)]);
    PeakFitter::default()
        .fit(&histogram, Region::new(45.0, 110.0).unwrap(), &[70.0, 82.0])
        .unwrap()
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fit.json");

    let mut result = two_peak_result();
    result.set_peak_uuid(1, 42).unwrap();
    result.save(&path).unwrap();

    let loaded = FitResult::load(&path).unwrap();
    assert_eq!(loaded, result);
    assert_eq!(loaded.peaks[1].uuid, Some(42));
    assert_eq!(loaded.peaks[0].uuid, None);
    assert!(loaded.fit_report().contains("g1 (uuid 42)"));
}

#[test]
fn test_reloaded_curve_regenerates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fit.json");

    let result = two_peak_result();
    result.save(&path).unwrap();

    let mut loaded = FitResult::load(&path).unwrap();
    loaded.curve.clear();
    loaded.regenerate_curve(result.curve.len());
    assert_eq!(loaded.curve, result.curve);

    let first = loaded.curve[0];
    let last = loaded.curve[loaded.curve.len() - 1];
    assert_eq!(first[0], 45.0);
    assert_relative_eq!(last[0], 110.0, epsilon = 1e-9);
}

#[test]
fn test_components_sum_to_model() {
    let result = two_peak_result();
    let x: Vec<f64> = (45..=110).map(f64::from).collect();

    let total = result.eval(&x);
    let components = result.eval_components(&x);
    assert_eq!(components.peaks.len(), 2);
    for (i, &value) in total.iter().enumerate() {
        let sum = components.background[i] + components.peaks.iter().map(|p| p[i]).sum::<f64>();
        assert_relative_eq!(sum, value, max_relative = 1e-12);
    }

    // The fit reproduces noise-free data
    let histogram = spectrum(0.0, 200, |x| 0.02 * x + 8.0, &[(400.0, 70.0, 3.0), (250.0, 82.0, 3.0)]);
    for (i, &xi) in x.iter().enumerate() {
        assert_relative_eq!(total[i], histogram.counts()[xi as usize], max_relative = 1e-4);
    }
}

#[test]
fn test_uuid_index_out_of_range() {
    let mut result = PeakFitter::default()
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[])
        .unwrap();
    match result.set_peak_uuid(3, 7) {
        Err(PeakFitError::PeakIndexOutOfRange { index, count }) => assert_eq!((index, count), (3, 1)),
        other => panic!("expected PeakIndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_settings_travel_with_results() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let settings = FitSettings::default()
        .with_equal_width(false)
        .with_width_limits(1.0, 6.0);
    settings.save(&path).unwrap();
    let loaded = FitSettings::load(&path).unwrap();
    assert_eq!(loaded, settings);

    let a = PeakFitter::new(settings)
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[100.0])
        .unwrap();
    let b = PeakFitter::new(loaded)
        .fit(&reference_spectrum(), Region::new(80.0, 120.0).unwrap(), &[100.0])
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = FitResult::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(PeakFitError::IoError(_))));
}

#[test]
fn test_load_rejects_reversed_region() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fit.json");
    two_peak_result().save(&path).unwrap();

    let mut json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    json["region"] = serde_json::json!({ "low": 110.0, "high": 45.0 });
    std::fs::write(&path, json.to_string()).unwrap();

    assert!(matches!(FitResult::load(&path), Err(PeakFitError::JsonError(_))));
}
