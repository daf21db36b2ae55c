//! Synthetic spectra shared by the integration tests.

use peakfit_rs::models::gaussian;
use peakfit_rs::Histogram;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};

/// A Gaussian term given as `(amplitude, center, sigma)`.
pub type Peak = (f64, f64, f64);

/// Counts of `background(x)` plus the peaks at each center.
pub fn counts_at<F>(centers: &[f64], background: F, peaks: &[Peak]) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    centers
        .iter()
        .map(|&x| {
            background(x)
                + peaks
                    .iter()
                    .map(|&(a, c, s)| gaussian(x, a, c, s))
                    .sum::<f64>()
        })
        .collect()
}

/// Noise-free spectrum with `n` unit-width bins centered on `start, start + 1, ...`.
pub fn spectrum<F>(start: f64, n: usize, background: F, peaks: &[Peak]) -> Histogram
where
    F: Fn(f64) -> f64,
{
    let centers: Vec<f64> = (0..n).map(|i| start + i as f64).collect();
    let counts = counts_at(&centers, background, peaks);
    Histogram::new(centers, counts).unwrap()
}

/// The same spectrum with Poisson counting noise from a fixed seed.
pub fn noisy_spectrum<F>(start: f64, n: usize, background: F, peaks: &[Peak], seed: u64) -> Histogram
where
    F: Fn(f64) -> f64,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centers: Vec<f64> = (0..n).map(|i| start + i as f64).collect();
    let counts = counts_at(&centers, background, peaks)
        .into_iter()
        .map(|mean| {
            if mean > 0.0 {
                Poisson::new(mean).unwrap().sample(&mut rng)
            } else {
                0.0
            }
        })
        .collect();
    Histogram::new(centers, counts).unwrap()
}

/// 200 unit bins, one peak of height 500 at 100 with sigma 3 on a flat
/// background of 10 counts.
pub fn reference_spectrum() -> Histogram {
    spectrum(0.0, 200, |_| 10.0, &[(500.0, 100.0, 3.0)])
}
