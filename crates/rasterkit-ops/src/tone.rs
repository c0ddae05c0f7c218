//! Histogram-driven tonal adjustments.
//!
//! Brightness, contrast and robust (percentile) contrast. Each operator
//! edits only the luma of the source pixels and keeps their chroma, and
//! each reads only its source, so applying one twice with the same
//! parameter gives the same result.
//!
//! The slider-style percent inputs of an interactive front end map to
//! operator parameters through [`brightness_delta_from_percent`],
//! [`contrast_factor_from_percent`] and [`robust_clip_from_percent`].
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{Rgb, RgbImage};
//! use rasterkit_ops::tone::{brightness, brightness_delta_from_percent};
//!
//! let img = RgbImage::filled(2, 2, Rgb::gray(50));
//! let delta = brightness_delta_from_percent(10.0);
//! assert_eq!(delta, 25);
//! let out = brightness(&img, delta);
//! assert!(out.pixel(0, 0).r > 50);
//! ```

use rasterkit_core::{luma_of, with_luma, Histogram, RgbImage};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Converts a brightness percentage to a luma offset: `trunc(p/100 * 255)`.
pub fn brightness_delta_from_percent(percent: f64) -> i32 {
    (percent / 100.0 * 255.0).trunc() as i32
}

/// Converts a contrast percentage to a gain: `1 + p/100`.
pub fn contrast_factor_from_percent(percent: f64) -> f64 {
    1.0 + percent / 100.0
}

/// Converts a robust-contrast percentage to a clip fraction: `p/200`.
pub fn robust_clip_from_percent(percent: f64) -> f64 {
    percent / 200.0
}

/// Adds `delta` to the luma of every pixel, clamped to `[0, 255]`.
pub fn brightness(source: &RgbImage, delta: i32) -> RgbImage {
    trace!(delta, "brightness");
    source.map_pixels(|px| with_luma(px, (luma_of(px) + delta).clamp(0, 255)))
}

/// Scales luma around the median of `source`.
///
/// See [`contrast_with_histogram`].
pub fn contrast(source: &RgbImage, factor: f64) -> OpsResult<RgbImage> {
    contrast_with_histogram(source, &Histogram::from_image(source), factor)
}

/// Scales luma around the median of `hist`:
/// `Y' = clamp(b + trunc((Y - b) * factor))`.
///
/// `hist` must be the histogram of `source`.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `factor` is negative or not finite.
pub fn contrast_with_histogram(source: &RgbImage, hist: &Histogram, factor: f64) -> OpsResult<RgbImage> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(OpsError::param(format!(
            "contrast factor must be finite and non-negative, got {factor}"
        )));
    }
    let pivot = hist.median() as i32;
    debug!(pivot, factor, "contrast");
    Ok(source.map_pixels(|px| {
        let y = luma_of(px);
        let scaled = pivot + ((y - pivot) as f64 * factor).trunc() as i32;
        with_luma(px, scaled.clamp(0, 255))
    }))
}

/// Percentile contrast stretch of `source`.
///
/// See [`robust_contrast_with_histogram`].
pub fn robust_contrast(source: &RgbImage, clip: f64) -> OpsResult<RgbImage> {
    robust_contrast_with_histogram(source, &Histogram::from_image(source), clip)
}

/// Maps the luma range between the `clip` and `1 - clip` quantiles of
/// `hist` linearly onto `[0, 255]`, saturating everything outside.
///
/// A `clip` of exactly 0 leaves the image unchanged.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `clip` is outside `[0, 0.5)`, or if
/// `clip > 0` and the two quantiles coincide.
pub fn robust_contrast_with_histogram(source: &RgbImage, hist: &Histogram, clip: f64) -> OpsResult<RgbImage> {
    if !clip.is_finite() || !(0.0..0.5).contains(&clip) {
        return Err(OpsError::param(format!(
            "clip fraction must be in [0, 0.5), got {clip}"
        )));
    }
    if clip == 0.0 {
        debug!("robust contrast: zero clip, image unchanged");
        return Ok(source.clone());
    }
    let (low, high) = robust_bounds(hist, clip)?;
    let ratio = 255.0 / (high - low) as f64;
    debug!(clip, low, high, "robust contrast");

    Ok(source.map_pixels(|px| {
        let y = luma_of(px);
        let stretched = if y <= low {
            0
        } else if y >= high {
            255
        } else {
            ((y - low) as f64 * ratio).trunc() as i32
        };
        with_luma(px, stretched)
    }))
}

/// Lower and upper clip points of the robust stretch.
pub fn robust_bounds(hist: &Histogram, clip: f64) -> OpsResult<(i32, i32)> {
    let n = hist.total() as f64;
    let low = hist.cumulative_index(clip * n);
    let high = hist.cumulative_index((1.0 - clip) * n);
    match (low, high) {
        (Some(low), Some(high)) if high > low => Ok((low as i32, high as i32)),
        (Some(low), Some(high)) => Err(OpsError::param(format!(
            "degenerate histogram: clip points coincide (low {low}, high {high})"
        ))),
        _ => Err(OpsError::param("empty histogram")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_core::Rgb;

    fn two_tone(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, _| if x < w / 2 { Rgb::gray(60) } else { Rgb::gray(180) }).unwrap()
    }

    #[test]
    fn test_percent_conversions() {
        assert_eq!(brightness_delta_from_percent(0.0), 0);
        assert_eq!(brightness_delta_from_percent(50.0), 127);
        assert_eq!(brightness_delta_from_percent(100.0), 255);
        assert_eq!(contrast_factor_from_percent(50.0), 1.5);
        assert_eq!(robust_clip_from_percent(10.0), 0.05);
    }

    #[test]
    fn test_brightness_zero_is_identity() {
        let img = RgbImage::from_fn(5, 5, |x, y| Rgb::new(x as u8 * 50, y as u8 * 40, 90)).unwrap();
        assert_eq!(brightness(&img, 0), img);
    }

    #[test]
    fn test_brightness_saturates() {
        let img = RgbImage::filled(2, 2, Rgb::gray(10));
        let out = brightness(&img, 255);
        assert_eq!(out.pixel(1, 1), Rgb::WHITE);
    }

    #[test]
    fn test_brightness_stateless() {
        let img = two_tone(6, 2);
        let once = brightness(&img, 40);
        let twice = brightness(&img, 40);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_contrast_uniform_gray_unchanged() {
        let img = RgbImage::filled(8, 8, Rgb::gray(128));
        for factor in [0.0, 0.5, 1.0, 1.7, 2.0] {
            assert_eq!(contrast(&img, factor).unwrap(), img);
        }
    }

    #[test]
    fn test_contrast_spreads_tones() {
        let img = two_tone(4, 1);
        let hist = Histogram::from_image(&img);
        let out = contrast_with_histogram(&img, &hist, 2.0).unwrap();
        let before = luma_of(img.pixel(3, 0)) - luma_of(img.pixel(0, 0));
        let after = luma_of(out.pixel(3, 0)) - luma_of(out.pixel(0, 0));
        assert!(after > before);
    }

    #[test]
    fn test_contrast_rejects_factor() {
        let img = two_tone(4, 1);
        assert!(contrast(&img, -0.1).is_err());
        assert!(contrast(&img, f64::NAN).is_err());
    }

    #[test]
    fn test_robust_stretch() {
        let img = RgbImage::from_fn(100, 1, |x, _| Rgb::gray(x as u8 * 2)).unwrap();
        let out = robust_contrast(&img, 0.05).unwrap();
        assert_eq!(luma_of(out.pixel(0, 0)), luma_of(Rgb::BLACK));
        assert_eq!(out.pixel(99, 0), Rgb::WHITE);
        assert_eq!(out.pixel(2, 0), Rgb::BLACK);
    }

    #[test]
    fn test_robust_zero_clip_is_identity() {
        let img = RgbImage::from_fn(4, 1, |x, _| Rgb::gray([90, 110, 140, 190][x as usize])).unwrap();
        assert_eq!(robust_contrast(&img, 0.0).unwrap(), img);

        let flat = RgbImage::filled(3, 3, Rgb::gray(99));
        assert_eq!(robust_contrast(&flat, 0.0).unwrap(), flat);
    }

    #[test]
    fn test_robust_rejects_bad_clip() {
        let img = two_tone(4, 4);
        assert!(robust_contrast(&img, 0.5).is_err());
        assert!(robust_contrast(&img, -0.01).is_err());
    }

    #[test]
    fn test_robust_uniform_is_degenerate() {
        let img = RgbImage::filled(4, 4, Rgb::gray(99));
        let err = robust_contrast(&img, 0.1).unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));
    }
}
