//! Initial values for the joint fit: peak centers, widths, heights and the
//! center bounds that keep neighbouring peaks apart.

use crate::histogram::Region;
use crate::models::FWHM_FACTOR;
use ndarray::Array1;

/// Fraction of a center's bound span kept between its start and either bound.
const EDGE_MARGIN: f64 = 0.01;

/// Finite guesses inside `region`, sorted ascending, repeated guesses merged.
pub fn centers_in_region(guesses: &[f64], region: &Region) -> Vec<f64> {
    let mut centers: Vec<f64> = guesses
        .iter()
        .copied()
        .filter(|&c| c.is_finite() && region.contains(c))
        .collect();
    centers.sort_by(f64::total_cmp);
    centers.dedup();
    centers
}

/// Center of the first bin holding the maximum count.
pub fn max_bin_center(x: &Array1<f64>, y: &Array1<f64>) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if best.map_or(true, |(_, top)| yi > top) {
            best = Some((xi, yi));
        }
    }
    best.map(|(xi, _)| xi)
}

/// Index of the bin whose center is closest to `value`.
pub fn nearest_index(x: &Array1<f64>, value: f64) -> usize {
    x.iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, distance), (i, &xi)| {
            let d = (xi - value).abs();
            if d < distance {
                (i, d)
            } else {
                (best, distance)
            }
        })
        .0
}

/// Width estimate from the half-maximum crossings around `center`.
///
/// `heights` are the counts above background. The outermost bins still at or
/// below half maximum on either side bound the FWHM. Without a crossing on
/// both sides the estimate is two bin-widths, and it is never below that.
pub fn estimate_sigma(x: &Array1<f64>, heights: &Array1<f64>, center: f64, bin_width: f64) -> f64 {
    let floor = 2.0 * bin_width;
    if x.is_empty() {
        return floor;
    }

    let peak = nearest_index(x, center);
    let half_max = heights[peak] / 2.0;

    let left = (0..peak).rev().find(|&i| heights[i] <= half_max);
    let right = (peak..x.len()).find(|&i| heights[i] <= half_max);

    match (left, right) {
        (Some(l), Some(r)) => ((x[r] - x[l]) / FWHM_FACTOR).max(floor),
        _ => floor,
    }
}

/// Starting amplitude for each center: the height above background of its
/// nearest bin.
///
/// A non-positive height is replaced by a tenth of the tallest height in the
/// region (or 1 when nothing rises above the background), so the amplitude
/// does not start on its lower bound.
pub fn amplitudes(x: &Array1<f64>, heights: &Array1<f64>, centers: &[f64]) -> Vec<f64> {
    let tallest = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let fallback = if tallest > 0.0 { 0.1 * tallest } else { 1.0 };
    centers
        .iter()
        .map(|&c| {
            let height = heights[nearest_index(x, c)];
            if height > 0.0 {
                height
            } else {
                fallback
            }
        })
        .collect()
}

/// The center whose nearest bin is tallest, the first one on a tie.
pub fn tallest_center(x: &Array1<f64>, heights: &Array1<f64>, centers: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for &c in centers {
        let height = heights[nearest_index(x, c)];
        if best.map_or(true, |(_, top)| height > top) {
            best = Some((c, height));
        }
    }
    best.map(|(c, _)| c)
}

/// Starting value for a free center, moved off its bounds.
///
/// At a bound the bounds transform has zero slope and the optimizer could
/// never move the center away from it.
pub fn start_inside(value: f64, (min, max): (f64, f64)) -> f64 {
    let margin = EDGE_MARGIN * (max - min);
    if margin > 0.0 {
        value.clamp(min + margin, max - margin)
    } else {
        value
    }
}

/// `(min, max)` for each sorted center: the region edge for the outermost
/// peaks, the midpoint to the neighbour otherwise.
pub fn center_bounds(centers: &[f64], region: &Region) -> Vec<(f64, f64)> {
    let n = centers.len();
    (0..n)
        .map(|i| {
            let min = if i == 0 {
                region.low()
            } else {
                0.5 * (centers[i - 1] + centers[i])
            };
            let max = if i + 1 == n {
                region.high()
            } else {
                0.5 * (centers[i] + centers[i + 1])
            };
            (min, max)
        })
        .collect()
}
