//! Luma convolution engine.
//!
//! All filtering works on the luma of the source image. The result is
//! either recombined with the source chroma ([`Response::Intensity`]) or
//! written as a gray signed-deviation image ([`Response::Deviation`]).
//!
//! # Paths
//!
//! [`convolve`] checks the kernel rank by SVD. Rank-1 kernels run as two 1D
//! passes ([`separable_filter`]); anything else runs the direct 2D sum.
//! The horizontal pass writes an `f64` buffer. In the vertical pass, taps
//! that fall outside the image read the border luma of the *source*, not
//! the buffer.
//!
//! # Responses
//!
//! | Response | Pixel written |
//! |----------|---------------|
//! | `Intensity` | `floor(Σw·Y / Σ|w|)` clamped, recombined with source chroma |
//! | `Deviation` | `clamp(trunc(Σw·Y) + 127)` as gray |
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{Rgb, RgbImage};
//! use rasterkit_ops::filter::{convolve, FilterMode, Response};
//! use rasterkit_ops::{BorderStrategy, Kernel};
//!
//! let img = RgbImage::filled(8, 8, Rgb::gray(100));
//! let k: Kernel = "1,2,1;2,4,2;1,2,1".parse().unwrap();
//! let out = convolve(&img, &k, BorderStrategy::Clamp, FilterMode::Auto).unwrap();
//! assert!(out.separable);
//! assert_eq!(out.response, Response::Intensity);
//! assert_eq!(out.image, img);
//! ```

use std::str::FromStr;

use rasterkit_core::{luma_of, with_luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::border::BorderStrategy;
use crate::kernel::{gaussian_1d, Kernel};
use crate::{OpsError, OpsResult};

/// Guard against `x.999999` quantizing one level low.
const QUANT_EPS: f64 = 1e-6;

/// Offset added to deviation values so zero maps to mid-gray.
pub const DEVIATION_OFFSET: i32 = 127;

/// Requested interpretation of the filter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// `Deviation` for zero-sum kernels, `Intensity` otherwise.
    #[default]
    Auto,
    /// Force a normalized intensity response.
    Intensity,
    /// Force a signed deviation response.
    #[serde(alias = "derivative")]
    Deviation,
}

/// Interpretation actually applied to a filter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    /// Normalized luma recombined with the source chroma.
    Intensity,
    /// Signed value offset by 127, stored as gray.
    Deviation,
}

impl FilterMode {
    /// Resolves `Auto` against `kernel`.
    pub fn resolve(self, kernel: &Kernel) -> Response {
        match self {
            Self::Intensity => Response::Intensity,
            Self::Deviation => Response::Deviation,
            Self::Auto if kernel.is_zero_sum() => Response::Deviation,
            Self::Auto => Response::Intensity,
        }
    }
}

impl FromStr for FilterMode {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "intensity" => Ok(Self::Intensity),
            "deviation" | "derivative" => Ok(Self::Deviation),
            other => Err(OpsError::param(format!("unknown filter mode '{other}'"))),
        }
    }
}

/// Output of [`convolve`].
#[derive(Debug, Clone)]
pub struct Filtered {
    /// Filtered image, same size as the source.
    pub image: RgbImage,
    /// Response that was applied.
    pub response: Response,
    /// Whether the two-pass path was taken.
    pub separable: bool,
}

/// Per-pixel luma of an image with border-aware lookup.
#[derive(Debug, Clone)]
pub(crate) struct LumaPlane {
    width: u32,
    height: u32,
    data: Vec<i32>,
}

impl LumaPlane {
    pub(crate) fn new(img: &RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.pixels().iter().map(|&p| luma_of(p)).collect(),
        }
    }

    #[inline]
    pub(crate) fn at(&self, x: u32, y: u32) -> i32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Luma at `(x, y)`, resolving out-of-range reads through `border`.
    #[inline]
    pub(crate) fn sample(&self, x: i64, y: i64, border: BorderStrategy) -> i32 {
        if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
            return self.at(x as u32, y as u32);
        }
        match border.resolve(x, y, self.width, self.height) {
            Some((rx, ry)) => self.at(rx, ry),
            None => luma_of(Rgb::BLACK),
        }
    }
}

/// Writes one filtered value for the pixel whose source is `src`.
#[inline]
fn respond(value: f64, norm: f64, src: Rgb, response: Response) -> Rgb {
    match response {
        Response::Intensity => {
            let y = (value / norm + QUANT_EPS).floor().clamp(0.0, 255.0) as i32;
            with_luma(src, y)
        }
        Response::Deviation => {
            let v = (value.trunc() as i64 + DEVIATION_OFFSET as i64).clamp(0, 255);
            Rgb::gray(v as u8)
        }
    }
}

fn check_taps(name: &str, taps: &[f64]) -> OpsResult<()> {
    if taps.is_empty() || taps.len() % 2 == 0 {
        return Err(OpsError::param(format!(
            "{name} must have odd positive length, got {}",
            taps.len()
        )));
    }
    if taps.iter().any(|w| !w.is_finite()) {
        return Err(OpsError::param(format!("{name} contains non-finite weights")));
    }
    Ok(())
}

/// Convolves the luma of `source` with `kernel`.
///
/// # Errors
///
/// - [`OpsError::DegenerateKernel`] if the response is `Intensity` and all
///   weights are zero.
///
/// Kernel shape and weights are validated when the [`Kernel`] is built.
pub fn convolve(
    source: &RgbImage,
    kernel: &Kernel,
    border: BorderStrategy,
    mode: FilterMode,
) -> OpsResult<Filtered> {
    let response = mode.resolve(kernel);
    trace!(
        rows = kernel.rows(),
        cols = kernel.cols(),
        ?border,
        ?response,
        "convolve"
    );
    if response == Response::Intensity && kernel.abs_sum() == 0.0 {
        return Err(OpsError::DegenerateKernel);
    }

    if let Some(sep) = kernel.separate() {
        let image = separable_filter(source, &sep.hx, &sep.hy, border, response)?;
        return Ok(Filtered {
            image,
            response,
            separable: true,
        });
    }

    debug!("kernel has rank > 1, using direct 2D convolution");
    Ok(Filtered {
        image: convolve_direct(source, kernel, border, response),
        response,
        separable: false,
    })
}

/// Direct 2D weighted sum. Always valid, regardless of kernel rank.
pub fn convolve_direct(
    source: &RgbImage,
    kernel: &Kernel,
    border: BorderStrategy,
    response: Response,
) -> RgbImage {
    let plane = LumaPlane::new(source);
    let (w, h) = source.dimensions();
    let (rx, ry) = kernel.radius();
    let (rx, ry) = (rx as i64, ry as i64);
    let norm = kernel.abs_sum();

    let mut out = Vec::with_capacity(source.pixel_count());
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let interior = x >= rx && y >= ry && x + rx < w as i64 && y + ry < h as i64;
            let mut value = 0.0;
            for v in 0..kernel.rows() {
                let sy = y - ry + v as i64;
                for u in 0..kernel.cols() {
                    let sx = x - rx + u as i64;
                    let l = if interior {
                        plane.at(sx as u32, sy as u32)
                    } else {
                        plane.sample(sx, sy, border)
                    };
                    value += kernel.get(v, u) * l as f64;
                }
            }
            out.push(respond(value, norm, source.pixel(x as u32, y as u32), response));
        }
    }
    rebuild(source, out)
}

/// Two-pass filter with horizontal taps `hx` and vertical taps `hy`.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] if either tap vector is empty, of even
///   length, or non-finite.
/// - [`OpsError::DegenerateKernel`] for an `Intensity` response when either
///   vector sums to zero in absolute value.
pub fn separable_filter(
    source: &RgbImage,
    hx: &[f64],
    hy: &[f64],
    border: BorderStrategy,
    response: Response,
) -> OpsResult<RgbImage> {
    check_taps("hx", hx)?;
    check_taps("hy", hy)?;
    let nx: f64 = hx.iter().map(|w| w.abs()).sum();
    let ny: f64 = hy.iter().map(|w| w.abs()).sum();
    if response == Response::Intensity && (nx == 0.0 || ny == 0.0) {
        return Err(OpsError::DegenerateKernel);
    }
    trace!(taps_x = hx.len(), taps_y = hy.len(), ?border, ?response, "separable_filter");

    let plane = LumaPlane::new(source);
    let (w, h) = source.dimensions();
    let (w_i, h_i) = (w as i64, h as i64);
    let rx = (hx.len() / 2) as i64;
    let ry = (hy.len() / 2) as i64;

    // horizontal pass
    let mut buffer = vec![0.0f64; source.pixel_count()];
    for y in 0..h_i {
        let row = y as usize * w as usize;
        for x in 0..w_i {
            let mut total = 0.0;
            for (i, &wx) in hx.iter().enumerate() {
                total += wx * plane.sample(x - rx + i as i64, y, border) as f64;
            }
            buffer[row + x as usize] = match response {
                Response::Intensity => total / nx,
                Response::Deviation => total,
            };
        }
    }

    // vertical pass
    let mut out = Vec::with_capacity(source.pixel_count());
    for y in 0..h_i {
        for x in 0..w_i {
            let mut total = 0.0;
            for (j, &wy) in hy.iter().enumerate() {
                let sy = y - ry + j as i64;
                let value = if sy >= 0 && sy < h_i {
                    buffer[sy as usize * w as usize + x as usize]
                } else {
                    plane.sample(x, sy, border) as f64
                };
                total += wy * value;
            }
            out.push(respond(total, ny, source.pixel(x as u32, y as u32), response));
        }
    }
    Ok(rebuild(source, out))
}

/// Gaussian blur of the luma, recombined with the source chroma.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `sigma` is finite and positive
/// with a kernel no wider than [`crate::kernel::MAX_GAUSSIAN_HALFWIDTH`].
pub fn gaussian_blur(source: &RgbImage, sigma: f64, border: BorderStrategy) -> OpsResult<RgbImage> {
    let g = gaussian_1d(sigma)?;
    debug!(sigma, taps = g.len(), "gaussian blur");
    separable_filter(source, &g, &g, border, Response::Intensity)
}

fn rebuild(source: &RgbImage, pixels: Vec<Rgb>) -> RgbImage {
    let mut img = source.clone();
    img.pixels_mut().copy_from_slice(&pixels);
    img
}

/// Central-difference luma gradient.
///
/// All grids are row-major with the image's width and height.
#[derive(Debug, Clone)]
pub struct GradientField {
    width: u32,
    height: u32,
    ix: Vec<f64>,
    iy: Vec<f64>,
    magnitude: Vec<f64>,
}

impl GradientField {
    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Horizontal derivative at `(x, y)`.
    #[inline]
    pub fn ix(&self, x: u32, y: u32) -> f64 {
        self.ix[self.idx(x, y)]
    }

    /// Vertical derivative at `(x, y)`.
    #[inline]
    pub fn iy(&self, x: u32, y: u32) -> f64 {
        self.iy[self.idx(x, y)]
    }

    /// Gradient magnitude at `(x, y)`.
    #[inline]
    pub fn magnitude(&self, x: u32, y: u32) -> f64 {
        self.magnitude[self.idx(x, y)]
    }

    /// Row-major magnitude grid.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitude
    }
}

/// Gradient of the luma of `image` using the `[-0.5, 0, 0.5]` derivative
/// in both directions, out-of-range taps through `border`.
pub fn gradient(image: &RgbImage, border: BorderStrategy) -> GradientField {
    let plane = LumaPlane::new(image);
    let (w, h) = image.dimensions();
    let n = image.pixel_count();
    let mut ix = Vec::with_capacity(n);
    let mut iy = Vec::with_capacity(n);
    let mut magnitude = Vec::with_capacity(n);

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let dx = 0.5 * (plane.sample(x + 1, y, border) - plane.sample(x - 1, y, border)) as f64;
            let dy = 0.5 * (plane.sample(x, y + 1, border) - plane.sample(x, y - 1, border)) as f64;
            ix.push(dx);
            iy.push(dy);
            magnitude.push(dx.hypot(dy));
        }
    }
    trace!(width = w, height = h, ?border, "gradient");
    GradientField {
        width: w,
        height: h,
        ix,
        iy,
        magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gradient_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb::new((x * 13 + y * 7) as u8, (x * 3) as u8, (255 - y * 11) as u8)).unwrap()
    }

    #[test]
    fn test_identity_kernel() {
        let img = gradient_image(9, 7);
        let k = Kernel::new(1, 1, vec![1.0]).unwrap();
        let out = convolve(&img, &k, BorderStrategy::Pad, FilterMode::Auto).unwrap();
        assert_eq!(out.image, img);
    }

    #[test]
    fn test_degenerate_kernel() {
        let img = gradient_image(4, 4);
        let k = Kernel::new(3, 3, vec![0.0; 9]).unwrap();
        let err = convolve(&img, &k, BorderStrategy::Pad, FilterMode::Intensity).unwrap_err();
        assert!(matches!(err, OpsError::DegenerateKernel));
        // Auto on an all-zero kernel also resolves to intensity
        let err = convolve(&img, &k, BorderStrategy::Pad, FilterMode::Auto).unwrap_err();
        assert!(matches!(err, OpsError::DegenerateKernel));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Derivative".parse::<FilterMode>().unwrap(), FilterMode::Deviation);
        assert_eq!("auto".parse::<FilterMode>().unwrap(), FilterMode::Auto);
        assert!("sobel".parse::<FilterMode>().is_err());
    }

    #[test]
    fn test_auto_resolves_deviation() {
        let img = RgbImage::filled(6, 6, Rgb::gray(90));
        let k: Kernel = "-1,0,1;-2,0,2;-1,0,1".parse().unwrap();
        let out = convolve(&img, &k, BorderStrategy::Clamp, FilterMode::Auto).unwrap();
        assert_eq!(out.response, Response::Deviation);
        // flat image, clamped border: zero derivative everywhere
        assert!(out.image.pixels().iter().all(|&p| p == Rgb::gray(127)));
    }

    #[test]
    fn test_deviation_clamps() {
        let img = RgbImage::from_fn(5, 1, |x, _| if x < 2 { Rgb::BLACK } else { Rgb::WHITE }).unwrap();
        let k: Kernel = "-10,0,10".parse().unwrap();
        let out = convolve(&img, &k, BorderStrategy::Clamp, FilterMode::Deviation).unwrap();
        assert_eq!(out.image.pixel(2, 0), Rgb::WHITE);
        assert_eq!(out.image.pixel(4, 0), Rgb::gray(127));
    }

    #[test]
    fn test_non_separable_path() {
        let img = RgbImage::filled(5, 5, Rgb::gray(200));
        let k: Kernel = "0,1,0;1,1,1;0,1,0".parse().unwrap();
        let out = convolve(&img, &k, BorderStrategy::Clamp, FilterMode::Auto).unwrap();
        assert!(!out.separable);
        assert_eq!(out.image, img);
    }

    #[test]
    fn test_pad_darkens_corners() {
        let img = RgbImage::filled(5, 5, Rgb::WHITE);
        let out = gaussian_blur(&img, 1.0, BorderStrategy::Pad).unwrap();
        assert!(luma_of(out.pixel(0, 0)) < luma_of(out.pixel(2, 2)));
        let clamped = gaussian_blur(&img, 1.0, BorderStrategy::Clamp).unwrap();
        assert_eq!(clamped, img);
    }

    #[test]
    fn test_blur_rejects_oversized_sigma() {
        let img = RgbImage::filled(4, 4, Rgb::gray(90));
        for sigma in [1e6, 1e19] {
            assert!(matches!(
                gaussian_blur(&img, sigma, BorderStrategy::Clamp),
                Err(OpsError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_separable_filter_rejects_even_taps() {
        let img = RgbImage::filled(3, 3, Rgb::BLACK);
        assert!(separable_filter(&img, &[1.0, 1.0], &[1.0], BorderStrategy::Pad, Response::Intensity).is_err());
        assert!(matches!(
            separable_filter(&img, &[0.0], &[1.0], BorderStrategy::Pad, Response::Intensity),
            Err(OpsError::DegenerateKernel)
        ));
    }

    #[test]
    fn test_gradient_ramp() {
        let img = RgbImage::from_fn(6, 3, |x, _| Rgb::gray(x as u8 * 40)).unwrap();
        let g = gradient(&img, BorderStrategy::Clamp);
        let expect = 0.5 * (luma_of(img.pixel(3, 1)) - luma_of(img.pixel(1, 1))) as f64;
        assert_abs_diff_eq!(g.ix(2, 1), expect);
        assert_abs_diff_eq!(g.iy(2, 1), 0.0);
        assert_abs_diff_eq!(g.magnitude(2, 1), expect.abs());
    }
}
