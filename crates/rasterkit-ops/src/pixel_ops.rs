//! Per-pixel operators: grayscale, bit-depth quantization, cross overlay.

use rasterkit_core::{gray_pixel, Rgb, RgbImage};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Replaces every pixel with gray at its luma.
pub fn grayscale(source: &RgbImage) -> RgbImage {
    source.map_pixels(gray_pixel)
}

/// Reduces each channel to `bits` significant bits.
///
/// `c' = (c / div) * div` with `div = 2^(8 - bits)`; `bits == 8` is the
/// identity.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `1 <= bits <= 8`.
///
/// # Example
///
/// ```rust
/// use rasterkit_core::{Rgb, RgbImage};
/// use rasterkit_ops::pixel_ops::quantize;
///
/// let img = RgbImage::filled(1, 1, Rgb::new(200, 100, 50));
/// assert_eq!(quantize(&img, 1).unwrap().pixel(0, 0), Rgb::new(128, 0, 0));
/// ```
pub fn quantize(source: &RgbImage, bits: u8) -> OpsResult<RgbImage> {
    if !(1..=8).contains(&bits) {
        return Err(OpsError::param(format!("quantization bits must be in 1..=8, got {bits}")));
    }
    let div = 1u16 << (8 - bits);
    trace!(bits, div, "quantize");
    Ok(source.map_pixels(|px| px.map(|c| ((c as u16 / div) * div) as u8)))
}

/// Draws red diagonals over the top-left `min(w, h)` square.
///
/// The drawn span covers `floor(size * (percent + 1) / 100)` pixels centered
/// on the square; every other pixel keeps its source value.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `0 <= percent <= 100`.
pub fn draw_cross(source: &RgbImage, percent: u32) -> OpsResult<RgbImage> {
    if percent > 100 {
        return Err(OpsError::param(format!("cross percent must be in 0..=100, got {percent}")));
    }
    let size = source.width().min(source.height());
    let span = (size as f64 * ((percent + 1) as f64 / 100.0)) as u32;
    let offset = (size.saturating_sub(span) as f64 / 2.0) as u32;
    debug!(size, span, offset, "draw cross");

    let mut out = source.clone();
    for i in 0..size {
        if i > offset && i < offset + span {
            out.set_pixel(i, i, Rgb::RED)?;
            out.set_pixel(size - i - 1, i, Rgb::RED)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale() {
        let img = RgbImage::from_fn(3, 3, |x, y| Rgb::new(x as u8 * 80, y as u8 * 80, 40)).unwrap();
        let out = grayscale(&img);
        assert!(out.pixels().iter().all(|p| p.is_gray()));
        assert_eq!(out.pixel(0, 0), Rgb::gray(rasterkit_core::luma(0, 0, 40) as u8));
    }

    #[test]
    fn test_quantize_levels() {
        let img = RgbImage::from_fn(256, 1, |x, _| Rgb::gray(x as u8)).unwrap();
        for bits in 1..=8u8 {
            let out = quantize(&img, bits).unwrap();
            let mut levels: Vec<u8> = out.pixels().iter().map(|p| p.r).collect();
            levels.dedup();
            assert_eq!(levels.len(), 1 << bits);
        }
        assert_eq!(quantize(&img, 8).unwrap(), img);
    }

    #[test]
    fn test_quantize_rejects_bits() {
        let img = RgbImage::filled(1, 1, Rgb::WHITE);
        assert!(quantize(&img, 0).is_err());
        assert!(quantize(&img, 9).is_err());
    }

    #[test]
    fn test_cross_full() {
        let img = RgbImage::filled(10, 6, Rgb::gray(50));
        let out = draw_cross(&img, 99).unwrap();
        // span = 6, offset = 0, so i in 1..6 drawn
        assert_eq!(out.pixel(0, 0), Rgb::gray(50));
        assert_eq!(out.pixel(1, 1), Rgb::RED);
        assert_eq!(out.pixel(5, 5), Rgb::RED);
        assert_eq!(out.pixel(4, 1), Rgb::RED);
        assert_eq!(out.pixel(7, 3), Rgb::gray(50));
    }

    #[test]
    fn test_cross_stateless() {
        let img = RgbImage::filled(20, 20, Rgb::WHITE);
        let wide = draw_cross(&img, 90).unwrap();
        let narrow = draw_cross(&img, 10).unwrap();
        let count = |im: &RgbImage| im.pixels().iter().filter(|&&p| p == Rgb::RED).count();
        assert!(count(&wide) > count(&narrow));
        assert_eq!(draw_cross(&img, 10).unwrap(), narrow);
        assert!(draw_cross(&img, 101).is_err());
    }
}
