//! Canny edge detector.
//!
//! Pipeline:
//!
//! 1. Gaussian smoothing of the source luma (separable, caller's border)
//! 2. Central-difference gradient of the smoothed image
//! 3. Orientation quantization into four [`Sector`]s
//! 4. Non-maximum suppression along the gradient direction
//! 5. Hysteresis tracing from strong seeds through weak neighbors
//! 6. Binarization: white for edges, black elsewhere
//!
//! Steps 4 and 5 only consider interior pixels, so the outermost ring of
//! the image is never an edge.
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{Rgb, RgbImage};
//! use rasterkit_ops::canny::{canny, CannyParams};
//! use rasterkit_ops::BorderStrategy;
//!
//! let img = RgbImage::from_fn(16, 16, |x, _| if x < 8 { Rgb::BLACK } else { Rgb::WHITE }).unwrap();
//! let params = CannyParams { sigma: 1.0, t_low: 1.0, t_high: 2.0 };
//! let out = canny(&img, &params, BorderStrategy::Clamp).unwrap();
//! assert!(out.edges.is_edge(8, 8));
//! assert!(!out.edges.is_edge(2, 8));
//! ```

use std::f64::consts::FRAC_PI_8;

use rasterkit_core::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::border::BorderStrategy;
use crate::filter::{gaussian_blur, gradient, GradientField};
use crate::params;
use crate::{OpsError, OpsResult};

/// Canny parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannyParams {
    /// Gaussian smoothing sigma.
    pub sigma: f64,
    /// Hysteresis low threshold (edge continuation).
    pub t_low: f64,
    /// Hysteresis high threshold (edge seeds).
    pub t_high: f64,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            sigma: params::CANNY_SIGMA_DEFAULT,
            t_low: params::CANNY_T_LOW_DEFAULT,
            t_high: params::CANNY_T_HIGH_DEFAULT,
        }
    }
}

impl CannyParams {
    /// Checks `sigma > 0` and `0 < t_low <= t_high`, all finite.
    pub fn validate(&self) -> OpsResult<()> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(OpsError::param(format!("canny sigma must be positive, got {}", self.sigma)));
        }
        if !self.t_low.is_finite() || !self.t_high.is_finite() {
            return Err(OpsError::param("canny thresholds must be finite"));
        }
        if self.t_low <= 0.0 {
            return Err(OpsError::param(format!("t_low must be positive, got {}", self.t_low)));
        }
        if self.t_low > self.t_high {
            return Err(OpsError::param(format!(
                "t_low ({}) must not exceed t_high ({})",
                self.t_low, self.t_high
            )));
        }
        Ok(())
    }
}

/// Quantized gradient orientation.
///
/// Names give the gradient direction; the edge itself runs perpendicular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    /// Around 0°: neighbors left and right.
    Horizontal,
    /// Around 45°: neighbors top-left and bottom-right.
    Diagonal,
    /// Around 90°: neighbors above and below.
    Vertical,
    /// Around 135°: neighbors bottom-left and top-right.
    AntiDiagonal,
}

impl Sector {
    /// Classifies the gradient `(dx, dy)`.
    ///
    /// The vector is rotated by π/8 and folded into the upper half-plane,
    /// then split into four 45° wedges.
    pub fn from_gradient(dx: f64, dy: f64) -> Self {
        let (sin, cos) = FRAC_PI_8.sin_cos();
        let mut rx = cos * dx - sin * dy;
        let mut ry = sin * dx + cos * dy;
        if ry < 0.0 {
            rx = -rx;
            ry = -ry;
        }
        if rx >= 0.0 && rx >= ry {
            Self::Horizontal
        } else if rx >= 0.0 {
            Self::Diagonal
        } else if -rx < ry {
            Self::Vertical
        } else {
            Self::AntiDiagonal
        }
    }

    /// Index 0..=3 in the order 0°, 45°, 90°, 135°.
    pub fn index(self) -> u8 {
        match self {
            Self::Horizontal => 0,
            Self::Diagonal => 1,
            Self::Vertical => 2,
            Self::AntiDiagonal => 3,
        }
    }

    /// Offsets of the two neighbors compared during suppression.
    fn neighbors(self) -> [(i64, i64); 2] {
        match self {
            Self::Horizontal => [(-1, 0), (1, 0)],
            Self::Diagonal => [(-1, -1), (1, 1)],
            Self::Vertical => [(0, -1), (0, 1)],
            Self::AntiDiagonal => [(-1, 1), (1, -1)],
        }
    }
}

/// Orientation sector index of the gradient `(dx, dy)`, see
/// [`Sector::from_gradient`].
pub fn orientation_sector(dx: f64, dy: f64) -> u8 {
    Sector::from_gradient(dx, dy).index()
}

/// Binary edge map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    edges: Vec<bool>,
}

impl EdgeMap {
    fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            edges: vec![false; width as usize * height as usize],
        }
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Map width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` is an edge. Out-of-range coordinates are not.
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.edges[self.idx(x, y)]
    }

    /// Number of edge pixels.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|&&e| e).count()
    }

    /// White-on-black rendering.
    pub fn to_image(&self) -> OpsResult<RgbImage> {
        let pixels = self
            .edges
            .iter()
            .map(|&e| if e { Rgb::WHITE } else { Rgb::BLACK })
            .collect();
        Ok(RgbImage::from_pixels(self.width, self.height, pixels)?)
    }
}

/// Result of [`canny`].
#[derive(Debug, Clone)]
pub struct CannyOutput {
    /// Edge flags.
    pub edges: EdgeMap,
    /// Binarized image, white on black.
    pub image: RgbImage,
}

/// Runs the full Canny pipeline on `source`.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `params` fails
/// [`CannyParams::validate`].
pub fn canny(source: &RgbImage, params: &CannyParams, border: BorderStrategy) -> OpsResult<CannyOutput> {
    params.validate()?;
    trace!(?params, ?border, "canny");

    let smoothed = gaussian_blur(source, params.sigma, border)?;
    let grad = gradient(&smoothed, border);
    let nms = suppress(&grad, params.t_low);
    let edges = trace_edges(&nms, grad.width(), grad.height(), params.t_low, params.t_high);
    debug!(edges = edges.edge_count(), "canny done");

    let image = edges.to_image()?;
    Ok(CannyOutput { edges, image })
}

/// Non-maximum suppression. Returns surviving magnitudes, zero elsewhere.
fn suppress(grad: &GradientField, t_low: f64) -> Vec<f64> {
    let (w, h) = (grad.width(), grad.height());
    let mut nms = vec![0.0; w as usize * h as usize];
    if w < 3 || h < 3 {
        return nms;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let m = grad.magnitude(x, y);
            if m < t_low {
                continue;
            }
            let [(lx, ly), (rx, ry)] = Sector::from_gradient(grad.ix(x, y), grad.iy(x, y)).neighbors();
            let m_l = grad.magnitude((x as i64 + lx) as u32, (y as i64 + ly) as u32);
            let m_r = grad.magnitude((x as i64 + rx) as u32, (y as i64 + ry) as u32);
            if m_l <= m && m >= m_r {
                nms[y as usize * w as usize + x as usize] = m;
            }
        }
    }
    nms
}

/// Hysteresis: grows edges from seeds `>= t_high` through 8-connected
/// survivors `>= t_low`. Only interior pixels are marked.
fn trace_edges(nms: &[f64], width: u32, height: u32, t_low: f64, t_high: f64) -> EdgeMap {
    let mut map = EdgeMap::empty(width, height);
    if width < 3 || height < 3 {
        return map;
    }
    let w = width as usize;
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = y as usize * w + x as usize;
            if map.edges[i] || nms[i] < t_high {
                continue;
            }
            map.edges[i] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for ny in cy - 1..=cy + 1 {
                    for nx in cx - 1..=cx + 1 {
                        if nx < 1 || ny < 1 || nx >= width - 1 || ny >= height - 1 {
                            continue;
                        }
                        let j = ny as usize * w + nx as usize;
                        if !map.edges[j] && nms[j] >= t_low {
                            map.edges[j] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_axes() {
        assert_eq!(orientation_sector(1.0, 0.0), 0);
        assert_eq!(orientation_sector(-1.0, 0.0), 0);
        assert_eq!(orientation_sector(1.0, 1.0), 1);
        assert_eq!(orientation_sector(0.0, 1.0), 2);
        assert_eq!(orientation_sector(0.0, -1.0), 2);
        assert_eq!(orientation_sector(-1.0, 1.0), 3);
        assert_eq!(orientation_sector(1.0, -1.0), 3);
    }

    #[test]
    fn test_params_validation() {
        assert!(CannyParams::default().validate().is_ok());
        let bad = CannyParams { t_low: 4.0, t_high: 3.0, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = CannyParams { sigma: 0.0, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = CannyParams { t_low: 0.0, ..Default::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = RgbImage::filled(12, 12, Rgb::gray(77));
        let out = canny(&img, &CannyParams::default(), BorderStrategy::Clamp).unwrap();
        assert_eq!(out.edges.edge_count(), 0);
        assert!(out.image.pixels().iter().all(|&p| p == Rgb::BLACK));
    }

    #[test]
    fn test_tiny_image() {
        let img = RgbImage::filled(2, 5, Rgb::WHITE);
        let out = canny(&img, &CannyParams::default(), BorderStrategy::Pad).unwrap();
        assert_eq!(out.edges.edge_count(), 0);
        assert_eq!(out.image.dimensions(), (2, 5));
    }

    #[test]
    fn test_hysteresis_follows_weak_chain() {
        // strong seed at (2,2), weak chain to (5,2), isolated weak at (5,5)
        let (w, h) = (8u32, 8u32);
        let mut nms = vec![0.0; 64];
        nms[2 * 8 + 2] = 5.0;
        for x in 3..=5 {
            nms[2 * 8 + x] = 1.5;
        }
        nms[5 * 8 + 5] = 1.5;
        let map = trace_edges(&nms, w, h, 1.0, 3.0);
        assert!(map.is_edge(2, 2));
        assert!(map.is_edge(5, 2));
        assert!(!map.is_edge(5, 5));
        assert_eq!(map.edge_count(), 4);
    }

    #[test]
    fn test_border_ring_never_marked() {
        let mut nms = vec![10.0; 25];
        nms[12] = 10.0;
        let map = trace_edges(&nms, 5, 5, 1.0, 3.0);
        for i in 0..5 {
            assert!(!map.is_edge(i, 0));
            assert!(!map.is_edge(0, i));
            assert!(!map.is_edge(i, 4));
            assert!(!map.is_edge(4, i));
        }
        assert_eq!(map.edge_count(), 9);
    }
}
