//! BT.601-style luma/chroma color model.
//!
//! All tonal operators in rasterkit edit only the luma channel and keep the
//! chroma of the pixel they started from. This module provides the
//! conversions that make that possible:
//!
//! - [`luma`] - 8-bit RGB to studio-range luma (`16..=235` for valid input)
//! - [`YCbCr`] - full luma/chroma triple with its inverse transform
//! - [`with_luma`] - replace the luma of a pixel, keeping its chroma
//!
//! # Precision
//!
//! The forward and inverse transforms use integer truncation/rounding, so
//! `YCbCr::from_rgb(c).to_rgb()` only reproduces `c` to within 2 levels per
//! channel. Luma edits must therefore always recombine with the chroma of
//! the *source* pixel rather than a previously edited one, otherwise the
//! error compounds with every recomputation.
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{luma_of, with_luma, Rgb};
//!
//! let px = Rgb::new(200, 120, 40);
//! let brighter = with_luma(px, luma_of(px) + 20);
//! assert!(luma_of(brighter) > luma_of(px));
//! ```

use crate::pixel::Rgb;

const Y_R: f64 = 65.738;
const Y_G: f64 = 129.057;
const Y_B: f64 = 25.064;

const CB_R: f64 = -37.945;
const CB_G: f64 = -74.494;
const CB_B: f64 = 112.439;

const CR_R: f64 = 112.439;
const CR_G: f64 = -94.154;
const CR_B: f64 = -18.285;

const INV_Y: f64 = 298.082;
const INV_R_CR: f64 = 408.583;
const INV_G_CB: f64 = -100.291;
const INV_G_CR: f64 = -208.120;
const INV_B_CB: f64 = 516.411;

/// Luma offset of the studio-range encoding.
pub const LUMA_OFFSET: i32 = 16;
/// Chroma midpoint (zero color difference).
pub const CHROMA_MID: i32 = 128;

/// Perceptual luma of an RGB triple.
///
/// `floor(16 + (65.738 r + 129.057 g + 25.064 b) / 256)`. Not clamped; for
/// 8-bit channels the result always lies in `16..=235`.
///
/// # Example
///
/// ```rust
/// use rasterkit_core::luma;
///
/// assert_eq!(luma(0, 0, 0), 16);
/// assert_eq!(luma(255, 255, 255), 235);
/// ```
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> i32 {
    let weighted = Y_R * r as f64 + Y_G * g as f64 + Y_B * b as f64;
    (LUMA_OFFSET as f64 + weighted / 256.0).floor() as i32
}

/// Luma of a pixel.
#[inline]
pub fn luma_of(px: Rgb) -> i32 {
    luma(px.r, px.g, px.b)
}

/// Achromatic pixel carrying the luma of `px` in all three channels.
#[inline]
pub fn gray_pixel(px: Rgb) -> Rgb {
    Rgb::gray(luma_of(px).clamp(0, 255) as u8)
}

/// Replaces the luma of `source` with `y`, keeping the chroma of `source`.
///
/// If `y` equals the pixel's own luma the pixel is returned untouched, so
/// operators that leave a pixel's brightness alone never introduce
/// round-trip error.
#[inline]
pub fn with_luma(source: Rgb, y: i32) -> Rgb {
    let ycc = YCbCr::from_rgb(source);
    if ycc.y == y {
        return source;
    }
    YCbCr { y, ..ycc }.to_rgb()
}

/// Luma/chroma triple.
///
/// Components are kept as `i32` so intermediate edits may leave the 8-bit
/// range; [`to_rgb`](Self::to_rgb) clamps the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YCbCr {
    /// Luma
    pub y: i32,
    /// Blue-difference chroma
    pub cb: i32,
    /// Red-difference chroma
    pub cr: i32,
}

impl YCbCr {
    /// Creates a triple from its components.
    #[inline]
    pub const fn new(y: i32, cb: i32, cr: i32) -> Self {
        Self { y, cb, cr }
    }

    /// Forward transform.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rasterkit_core::{Rgb, YCbCr};
    ///
    /// let ycc = YCbCr::from_rgb(Rgb::gray(128));
    /// assert_eq!((ycc.cb, ycc.cr), (128, 128));
    /// ```
    pub fn from_rgb(px: Rgb) -> Self {
        let (r, g, b) = (px.r as f64, px.g as f64, px.b as f64);
        let cb = ((CB_R * r + CB_G * g + CB_B * b) / 256.0).round() as i32;
        let cr = ((CR_R * r + CR_G * g + CR_B * b) / 256.0).round() as i32;
        Self {
            y: luma(px.r, px.g, px.b),
            cb: CHROMA_MID + cb,
            cr: CHROMA_MID + cr,
        }
    }

    /// Inverse transform, each channel rounded and clamped to `[0, 255]`.
    pub fn to_rgb(self) -> Rgb {
        let y = INV_Y * (self.y - LUMA_OFFSET) as f64;
        let cb = (self.cb - CHROMA_MID) as f64;
        let cr = (self.cr - CHROMA_MID) as f64;

        let r = ((y + INV_R_CR * cr) / 256.0).round() as i32;
        let g = ((y + INV_G_CB * cb + INV_G_CR * cr) / 256.0).round() as i32;
        let b = ((y + INV_B_CB * cb) / 256.0).round() as i32;

        Rgb::from_clamped(r, g, b)
    }
}

impl From<Rgb> for YCbCr {
    fn from(px: Rgb) -> Self {
        Self::from_rgb(px)
    }
}

impl From<YCbCr> for Rgb {
    fn from(ycc: YCbCr) -> Self {
        ycc.to_rgb()
    }
}
