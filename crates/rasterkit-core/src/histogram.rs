//! Luma histogram and derived statistics.
//!
//! A [`Histogram`] counts pixels per luma value in 256 bins. The contrast
//! operators in `rasterkit-ops` derive their pivot and clip points from the
//! cumulative distribution via [`Histogram::cumulative_index`].
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{Histogram, Rgb, RgbImage};
//!
//! let img = RgbImage::from_fn(4, 1, |x, _| Rgb::gray(x as u8 * 60)).unwrap();
//! let hist = Histogram::from_image(&img);
//! assert_eq!(hist.total(), 4);
//! let stats = hist.stats();
//! assert!(stats.min < stats.max);
//! ```

use crate::color::luma_of;
use crate::image::RgbImage;

/// Number of histogram bins (one per 8-bit luma value).
pub const BIN_COUNT: usize = 256;

/// 256-bin luma histogram.
///
/// Invariant: the bin counts sum to the pixel count of the image it was
/// built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BIN_COUNT],
    total: u64,
}

/// Summary statistics of a [`Histogram`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramStats {
    /// Mean luma
    pub mean: f64,
    /// Population variance of luma
    pub variance: f64,
    /// Median luma, see [`Histogram::median`]
    pub median: u8,
    /// Smallest occupied bin
    pub min: u8,
    /// Largest occupied bin
    pub max: u8,
}

impl Histogram {
    /// Builds the luma histogram of `img`.
    pub fn from_image(img: &RgbImage) -> Self {
        let mut bins = [0u64; BIN_COUNT];
        for &px in img.pixels() {
            bins[luma_of(px).clamp(0, 255) as usize] += 1;
        }
        Self {
            bins,
            total: img.pixel_count() as u64,
        }
    }

    /// All bin counts, indexed by luma.
    #[inline]
    pub fn bins(&self) -> &[u64; BIN_COUNT] {
        &self.bins
    }

    /// Count of pixels with luma `k`.
    #[inline]
    pub fn count(&self, k: u8) -> u64 {
        self.bins[k as usize]
    }

    /// Number of pixels counted.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Height of the tallest bin.
    pub fn max_count(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Mean luma, `Σ(k·count) / N`.
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(k, &c)| k as f64 * c as f64)
            .sum();
        sum / self.total as f64
    }

    /// Population variance, `Σ((count/N)·(k - mean)²)`.
    pub fn variance(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let n = self.total as f64;
        self.bins
            .iter()
            .enumerate()
            .map(|(k, &c)| (c as f64 / n) * (k as f64 - mean).powi(2))
            .sum()
    }

    /// First bin whose cumulative count reaches `target`.
    ///
    /// Targets below 1 are raised to 1, so the result is always an occupied
    /// bin. Returns `None` if the histogram holds fewer than `target` pixels.
    pub fn cumulative_index(&self, target: f64) -> Option<u8> {
        let target = target.max(1.0);
        let mut cum = 0u64;
        for (k, &c) in self.bins.iter().enumerate() {
            cum += c;
            if cum as f64 >= target {
                return Some(k as u8);
            }
        }
        None
    }

    /// Median luma: first bin where the cumulative count reaches `N / 2`
    /// (integer division).
    pub fn median(&self) -> u8 {
        self.cumulative_index((self.total / 2) as f64).unwrap_or(0)
    }

    /// Smallest occupied bin.
    pub fn min(&self) -> Option<u8> {
        self.bins.iter().position(|&c| c > 0).map(|k| k as u8)
    }

    /// Largest occupied bin.
    pub fn max(&self) -> Option<u8> {
        self.bins.iter().rposition(|&c| c > 0).map(|k| k as u8)
    }

    /// Computes all summary statistics at once.
    pub fn stats(&self) -> HistogramStats {
        HistogramStats {
            mean: self.mean(),
            variance: self.variance(),
            median: self.median(),
            min: self.min().unwrap_or(0),
            max: self.max().unwrap_or(0),
        }
    }
}
