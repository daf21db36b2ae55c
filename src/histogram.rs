//! Binned 1D data, the fit region and background side-bands.

use crate::error::{PeakFitError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Relative tolerance on bin-width uniformity.
const WIDTH_TOLERANCE: f64 = 1e-6;

/// A uniformly binned histogram given by bin centers and counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    centers: Array1<f64>,
    counts: Array1<f64>,
    bin_width: f64,
}

impl Histogram {
    /// Build a histogram from bin centers and counts.
    ///
    /// # Errors
    ///
    /// `InvalidHistogram` when the lengths differ, there are fewer than two
    /// bins, a value is not finite, or the centers are not strictly increasing
    /// with a constant spacing.
    ///
    /// ```
    /// use peakfit_rs::Histogram;
    ///
    /// let hist = Histogram::new(vec![0.5, 1.5, 2.5], vec![3.0, 8.0, 2.0]).unwrap();
    /// assert_eq!(hist.bin_width(), 1.0);
    /// assert!(Histogram::new(vec![0.5, 1.5, 4.0], vec![3.0, 8.0, 2.0]).is_err());
    /// ```
    pub fn new(centers: Vec<f64>, counts: Vec<f64>) -> Result<Self> {
        if centers.len() != counts.len() {
            return Err(PeakFitError::InvalidHistogram(format!(
                "{} bin centers but {} counts",
                centers.len(),
                counts.len()
            )));
        }
        if centers.len() < 2 {
            return Err(PeakFitError::InvalidHistogram(format!(
                "at least two bins are required, got {}",
                centers.len()
            )));
        }
        if centers.iter().chain(counts.iter()).any(|v| !v.is_finite()) {
            return Err(PeakFitError::InvalidHistogram(
                "centers and counts must be finite".to_string(),
            ));
        }

        let bin_width = centers[1] - centers[0];
        if bin_width <= 0.0 {
            return Err(PeakFitError::InvalidHistogram(
                "bin centers must be strictly increasing".to_string(),
            ));
        }
        for (i, pair) in centers.windows(2).enumerate() {
            let width = pair[1] - pair[0];
            if width <= 0.0 {
                return Err(PeakFitError::InvalidHistogram(
                    "bin centers must be strictly increasing".to_string(),
                ));
            }
            if (width - bin_width).abs() > WIDTH_TOLERANCE * bin_width {
                return Err(PeakFitError::InvalidHistogram(format!(
                    "non-uniform bin width {} at bin {} (expected {})",
                    width,
                    i + 1,
                    bin_width
                )));
            }
        }

        Ok(Self {
            centers: Array1::from_vec(centers),
            counts: Array1::from_vec(counts),
            bin_width,
        })
    }

    /// Build a histogram spanning `[min, max]` with one bin per count; centers
    /// sit at bin midpoints.
    pub fn from_range(min: f64, max: f64, counts: Vec<f64>) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(PeakFitError::InvalidHistogram(format!(
                "invalid range [{}, {}]",
                min, max
            )));
        }
        let n = counts.len();
        if n == 0 {
            return Err(PeakFitError::InvalidHistogram(
                "at least two bins are required, got 0".to_string(),
            ));
        }
        let width = (max - min) / n as f64;
        let centers = (0..n).map(|i| min + (i as f64 + 0.5) * width).collect();
        Self::new(centers, counts)
    }

    pub fn centers(&self) -> &Array1<f64> {
        &self.centers
    }

    pub fn counts(&self) -> &Array1<f64> {
        &self.counts
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Always false; a valid histogram has at least two bins.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Bins whose center satisfies `keep`, as `(centers, counts)`.
    fn select<F>(&self, keep: F) -> (Array1<f64>, Array1<f64>)
    where
        F: Fn(f64) -> bool,
    {
        let (x, y): (Vec<f64>, Vec<f64>) = self
            .centers
            .iter()
            .zip(self.counts.iter())
            .filter(|&(&x, _)| keep(x))
            .map(|(&x, &y)| (x, y))
            .unzip();
        (Array1::from_vec(x), Array1::from_vec(y))
    }

    /// The bins inside `region` (inclusive).
    ///
    /// # Errors
    ///
    /// `EmptyRegion` when no bin center lies in the region.
    pub fn region_data(&self, region: &Region) -> Result<(Array1<f64>, Array1<f64>)> {
        let (x, y) = self.select(|x| region.contains(x));
        if x.is_empty() {
            return Err(PeakFitError::EmptyRegion {
                low: region.low(),
                high: region.high(),
            });
        }
        Ok((x, y))
    }

    /// The bins inside any of `bands`, each bin at most once.
    pub fn side_band_data(&self, bands: &[SideBand]) -> (Array1<f64>, Array1<f64>) {
        self.select(|x| bands.iter().any(|band| band.contains(x)))
    }
}

/// The closed interval `[low, high]` of bin centers used for a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionEdges")]
pub struct Region {
    low: f64,
    high: f64,
}

impl Region {
    /// # Errors
    ///
    /// `InvalidRegion` when either edge is not finite or `low >= high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        let reason = if !(low.is_finite() && high.is_finite()) {
            Some("edges must be finite")
        } else if low >= high {
            Some("low must be below high")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(PeakFitError::InvalidRegion {
                low,
                high,
                reason: reason.to_string(),
            }),
            None => Ok(Self { low, high }),
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.low && x <= self.high
    }

    /// One bin-width immediately outside each edge, sharing the edge.
    pub fn default_side_bands(&self, bin_width: f64) -> [SideBand; 2] {
        [
            SideBand::new(self.low - bin_width, self.low),
            SideBand::new(self.high, self.high + bin_width),
        ]
    }
}

/// Deserialized form of [`Region`], checked by [`Region::new`].
#[derive(Deserialize)]
struct RegionEdges {
    low: f64,
    high: f64,
}

impl TryFrom<RegionEdges> for Region {
    type Error = PeakFitError;

    fn try_from(edges: RegionEdges) -> Result<Self> {
        Region::new(edges.low, edges.high)
    }
}

/// A closed range used to pre-fit the background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SideBandEdges")]
pub struct SideBand {
    start: f64,
    end: f64,
}

impl SideBand {
    /// The two edges may be given in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }
}

#[derive(Deserialize)]
struct SideBandEdges {
    start: f64,
    end: f64,
}

impl From<SideBandEdges> for SideBand {
    fn from(edges: SideBandEdges) -> Self {
        Self::new(edges.start, edges.end)
    }
}

impl From<(f64, f64)> for SideBand {
    fn from((a, b): (f64, f64)) -> Self {
        Self::new(a, b)
    }
}
