//! Unsharp masking.
//!
//! Adds back the difference between the image and its Gaussian blur, but
//! only where the blurred image has a significant gradient. Flat regions
//! are left alone so noise is not amplified.

use rasterkit_core::{luma_of, with_luma, RgbImage};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::border::BorderStrategy;
use crate::filter::{gaussian_blur, gradient};
use crate::params;
use crate::{OpsError, OpsResult};

/// Unsharp-mask parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsharpParams {
    /// Blur sigma for the mask.
    pub sigma: f64,
    /// Gain applied to the mask.
    pub sharpness: f64,
    /// Minimum blurred gradient magnitude for sharpening (strictly greater).
    pub threshold: f64,
}

impl Default for UnsharpParams {
    fn default() -> Self {
        Self {
            sigma: params::USM_SIGMA_DEFAULT,
            sharpness: params::USM_SHARPNESS_DEFAULT,
            threshold: params::USM_T_C_DEFAULT,
        }
    }
}

impl UnsharpParams {
    /// Checks that all fields are finite and sigma is positive.
    pub fn validate(&self) -> OpsResult<()> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(OpsError::param(format!("usm sigma must be positive, got {}", self.sigma)));
        }
        if !self.sharpness.is_finite() || !self.threshold.is_finite() {
            return Err(OpsError::param("usm sharpness and threshold must be finite"));
        }
        Ok(())
    }
}

/// Sharpens `source`.
///
/// `Y' = trunc(Y + sharpness * (Y - Y_blur))` where the blurred gradient
/// magnitude exceeds the threshold, else `Y' = Y`. The result is clamped
/// and recombined with the source chroma.
///
/// # Example
///
/// ```rust
/// use rasterkit_core::{Rgb, RgbImage};
/// use rasterkit_ops::unsharp::{unsharp_mask, UnsharpParams};
/// use rasterkit_ops::BorderStrategy;
///
/// let flat = RgbImage::filled(8, 8, Rgb::new(30, 90, 200));
/// let out = unsharp_mask(&flat, &UnsharpParams::default(), BorderStrategy::Clamp).unwrap();
/// assert_eq!(out, flat);
/// ```
pub fn unsharp_mask(source: &RgbImage, params: &UnsharpParams, border: BorderStrategy) -> OpsResult<RgbImage> {
    params.validate()?;
    trace!(?params, ?border, "unsharp_mask");

    let blurred = gaussian_blur(source, params.sigma, border)?;
    let grad = gradient(&blurred, border);

    let mut sharpened = 0usize;
    let pixels = source
        .pixels()
        .iter()
        .zip(blurred.pixels())
        .zip(grad.magnitudes())
        .map(|((&src, &blur), &mag)| {
            let y = luma_of(src);
            if mag > params.threshold {
                sharpened += 1;
                let boosted = sharpened_luma(y, y - luma_of(blur), params.sharpness);
                with_luma(src, boosted.clamp(0, 255))
            } else {
                src
            }
        })
        .collect();
    debug!(sharpened, "unsharp mask applied");
    Ok(RgbImage::from_pixels(source.width(), source.height(), pixels)?)
}

/// Truncates the whole boosted value, so a negative fractional gain
/// rounds toward zero together with the luma.
#[inline]
fn sharpened_luma(y: i32, mask: i32, sharpness: f64) -> i32 {
    (y as f64 + sharpness * mask as f64).trunc() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_core::Rgb;

    #[test]
    fn test_flat_identity() {
        let img = RgbImage::filled(10, 10, Rgb::new(12, 200, 99));
        let out = unsharp_mask(&img, &UnsharpParams::default(), BorderStrategy::Mirror).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_step_gains_contrast() {
        let img = RgbImage::from_fn(16, 4, |x, _| if x < 8 { Rgb::gray(80) } else { Rgb::gray(160) }).unwrap();
        let params = UnsharpParams { sigma: 1.0, sharpness: 2.0, threshold: 0.5 };
        let out = unsharp_mask(&img, &params, BorderStrategy::Clamp).unwrap();
        assert!(luma_of(out.pixel(7, 1)) < luma_of(img.pixel(7, 1)));
        assert!(luma_of(out.pixel(8, 1)) > luma_of(img.pixel(8, 1)));
        assert_eq!(out.pixel(0, 1), img.pixel(0, 1));
    }

    #[test]
    fn test_sharpened_luma_truncates_sum() {
        assert_eq!(sharpened_luma(84, -3, 1.5), 79);
        assert_eq!(sharpened_luma(84, 3, 1.5), 88);
        assert_eq!(sharpened_luma(100, 0, 4.0), 100);
    }

    #[test]
    fn test_step_matches_mask_formula() {
        let img = RgbImage::from_fn(16, 4, |x, _| if x < 8 { Rgb::gray(80) } else { Rgb::gray(160) }).unwrap();
        let params = UnsharpParams { sigma: 1.0, sharpness: 1.3, threshold: 0.5 };
        let out = unsharp_mask(&img, &params, BorderStrategy::Clamp).unwrap();

        let blurred = gaussian_blur(&img, params.sigma, BorderStrategy::Clamp).unwrap();
        let grad = gradient(&blurred, BorderStrategy::Clamp);
        let mut fractional_darkening = 0;
        for (i, &mag) in grad.magnitudes().iter().enumerate() {
            let (x, y) = ((i % 16) as u32, (i / 16) as u32);
            let src = img.pixel(x, y);
            if mag <= params.threshold {
                assert_eq!(out.pixel(x, y), src);
                continue;
            }
            let luma = luma_of(src);
            let mask = luma - luma_of(blurred.pixel(x, y));
            if mask < 0 && mask % 10 != 0 {
                fractional_darkening += 1;
            }
            let expected = (luma as f64 + 1.3 * mask as f64).trunc() as i32;
            assert_eq!(out.pixel(x, y), with_luma(src, expected.clamp(0, 255)), "pixel ({x}, {y})");
        }
        assert!(fractional_darkening > 0);
    }

    #[test]
    fn test_high_threshold_is_identity() {
        let img = RgbImage::from_fn(8, 8, |x, y| Rgb::gray(((x + y) * 15) as u8)).unwrap();
        let params = UnsharpParams { threshold: 1e9, ..Default::default() };
        assert_eq!(unsharp_mask(&img, &params, BorderStrategy::Pad).unwrap(), img);
    }

    #[test]
    fn test_rejects_sigma() {
        let img = RgbImage::filled(3, 3, Rgb::BLACK);
        let params = UnsharpParams { sigma: -1.0, ..Default::default() };
        assert!(unsharp_mask(&img, &params, BorderStrategy::Pad).is_err());
    }
}
