//! Error types for rasterkit-core operations.
//!
//! The [`Error`] enum covers failures of image buffer construction and
//! pixel addressing. Higher-level crates wrap it (`rasterkit-ops` in
//! `OpsError::Core`, `rasterkit-io` in `IoError::Core`).
//!
//! # Usage
//!
//! ```rust
//! use rasterkit_core::{Error, Result};
//!
//! fn check(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//! assert!(check(3, 0, 3, 3).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or addressing images.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Invalid image dimensions.
    ///
    /// Returned when width or height is zero, or the raw buffer length
    /// doesn't match `width * height * 3`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(100, 50, 80, 60);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("80x60"));
        assert!(matches!(err, Error::OutOfBounds { x: 100, y: 50, .. }));
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(0, 4, "zero width");
        assert_eq!(err.to_string(), "invalid dimensions: 0x4 (zero width)");
    }
}
