//! Border extrapolation for out-of-range pixel reads.
//!
//! Every filter tap that falls outside the image is resolved through a
//! [`BorderStrategy`]. The strategy is a plain value passed to each
//! filtering call; there is no global "current strategy".
//!
//! # Strategies
//!
//! | Strategy | Out-of-range read |
//! |----------|-------------------|
//! | `Pad`    | opaque black |
//! | `Clamp`  | nearest edge pixel |
//! | `Mirror` | single-fold reflection |
//!
//! `Mirror` folds a coordinate once: `x > w-1` becomes `w-1-(x-w)` and
//! `x < 0` becomes `-x`. A coordinate more than one image-width outside
//! is still out of range after the fold and reads as black.
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{Rgb, RgbImage};
//! use rasterkit_ops::BorderStrategy;
//!
//! let img = RgbImage::filled(3, 3, Rgb::WHITE);
//! assert_eq!(BorderStrategy::Pad.sample(-1, 0, &img), Rgb::BLACK);
//! assert_eq!(BorderStrategy::Clamp.sample(-1, 0, &img), Rgb::WHITE);
//! ```

use std::fmt;
use std::str::FromStr;

use rasterkit_core::{luma_of, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::{OpsError, OpsResult};

/// How pixel reads outside the image are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStrategy {
    /// Out-of-range reads return black.
    #[default]
    Pad,
    /// Coordinates are clipped to the nearest row/column.
    #[serde(alias = "constant")]
    Clamp,
    /// Coordinates are reflected once at the image edge.
    Mirror,
}

impl BorderStrategy {
    /// All strategies, in menu order.
    pub const ALL: [BorderStrategy; 3] = [Self::Pad, Self::Clamp, Self::Mirror];

    /// Maps `(x, y)` to an in-range coordinate, or `None` for black.
    ///
    /// In-range coordinates are returned unchanged for every strategy.
    pub fn resolve(self, x: i64, y: i64, width: u32, height: u32) -> Option<(u32, u32)> {
        let (w, h) = (width as i64, height as i64);
        let (x, y) = match self {
            Self::Pad => (x, y),
            Self::Clamp => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            Self::Mirror => (fold(x, w), fold(y, h)),
        };
        if x >= 0 && y >= 0 && x < w && y < h {
            Some((x as u32, y as u32))
        } else {
            None
        }
    }

    /// Reads the pixel at `(x, y)`, extrapolating when out of range.
    #[inline]
    pub fn sample(self, x: i64, y: i64, img: &RgbImage) -> Rgb {
        if img.contains(x, y) {
            return img.pixel(x as u32, y as u32);
        }
        match self.resolve(x, y, img.width(), img.height()) {
            Some((rx, ry)) => img.pixel(rx, ry),
            None => Rgb::BLACK,
        }
    }

    /// Luma of [`sample`](Self::sample).
    #[inline]
    pub fn sample_luma(self, x: i64, y: i64, img: &RgbImage) -> i32 {
        luma_of(self.sample(x, y, img))
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Clamp => "clamp",
            Self::Mirror => "mirror",
        }
    }
}

#[inline]
fn fold(v: i64, len: i64) -> i64 {
    if v > len - 1 {
        len - 1 - (v - len)
    } else if v < 0 {
        -v
    } else {
        v
    }
}

impl fmt::Display for BorderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BorderStrategy {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pad" | "black" | "zero" => Ok(Self::Pad),
            "clamp" | "constant" | "edge" => Ok(Self::Clamp),
            "mirror" | "reflect" => Ok(Self::Mirror),
            other => Err(OpsError::param(format!(
                "unknown border strategy '{other}' (expected pad, clamp or mirror)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb::new(x as u8 * 10, y as u8 * 10, 0)).unwrap()
    }

    #[test]
    fn test_white_3x3_edges() {
        let img = RgbImage::filled(3, 3, Rgb::WHITE);
        assert_eq!(BorderStrategy::Pad.sample(-1, 0, &img), Rgb::BLACK);
        assert_eq!(BorderStrategy::Clamp.sample(-1, 0, &img), img.pixel(0, 0));
        assert_eq!(BorderStrategy::Mirror.sample(3, 0, &img), img.pixel(1, 0));
    }

    #[test]
    fn test_in_range_identity() {
        let img = ramp(4, 3);
        for s in BorderStrategy::ALL {
            assert_eq!(s.sample(2, 1, &img), img.pixel(2, 1));
            assert_eq!(s.resolve(3, 2, 4, 3), Some((3, 2)));
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(BorderStrategy::Clamp.resolve(-5, 9, 4, 3), Some((0, 2)));
        assert_eq!(BorderStrategy::Clamp.resolve(100, -1, 4, 3), Some((3, 0)));
    }

    #[test]
    fn test_mirror_single_fold() {
        // high side: w-1-(x-w); low side: -x
        assert_eq!(BorderStrategy::Mirror.resolve(4, 0, 4, 3), Some((3, 0)));
        assert_eq!(BorderStrategy::Mirror.resolve(5, 0, 4, 3), Some((2, 0)));
        assert_eq!(BorderStrategy::Mirror.resolve(-1, -2, 4, 3), Some((1, 2)));
    }

    #[test]
    fn test_mirror_does_not_refold() {
        // x = -5 folds to 5, still outside a 4-wide image
        assert_eq!(BorderStrategy::Mirror.resolve(-5, 0, 4, 3), None);
        assert_eq!(BorderStrategy::Mirror.resolve(9, 0, 4, 3), None);
        let img = RgbImage::filled(4, 3, Rgb::WHITE);
        assert_eq!(BorderStrategy::Mirror.sample(-5, 0, &img), Rgb::BLACK);
    }

    #[test]
    fn test_parse() {
        assert_eq!("pad".parse::<BorderStrategy>().unwrap(), BorderStrategy::Pad);
        assert_eq!("Constant".parse::<BorderStrategy>().unwrap(), BorderStrategy::Clamp);
        assert_eq!(" mirror ".parse::<BorderStrategy>().unwrap(), BorderStrategy::Mirror);
        assert!("wrap".parse::<BorderStrategy>().is_err());
        assert_eq!(BorderStrategy::default(), BorderStrategy::Pad);
    }

    #[test]
    fn test_serde_names() {
        let s: BorderStrategy = serde_yaml::from_str("constant").unwrap();
        assert_eq!(s, BorderStrategy::Clamp);
        assert_eq!(serde_yaml::to_string(&BorderStrategy::Mirror).unwrap().trim(), "mirror");
    }
}
