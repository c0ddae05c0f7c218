//! # rasterkit-core
//!
//! Core types for 8-bit raster image processing.
//!
//! This crate provides the foundational types used throughout rasterkit:
//!
//! - [`Rgb`] - 8-bit RGB pixel
//! - [`RgbImage`] - Owned, row-major RGB pixel grid
//! - [`YCbCr`], [`luma`] - BT.601-style luma/chroma color model
//! - [`Histogram`] - 256-bin luma distribution and its statistics
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other rasterkit crates
//! depend on `rasterkit-core`:
//!
//! ```text
//! rasterkit-core (this crate)
//!    ^
//!    |
//!    +-- rasterkit-ops (filters, contrast, Canny, unsharp mask)
//!    +-- rasterkit-io (PNG/JPEG)
//!    +-- rasterkit-cli
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rasterkit_core::{Histogram, Rgb, RgbImage};
//!
//! let img = RgbImage::filled(4, 4, Rgb::gray(128));
//! let hist = Histogram::from_image(&img);
//! assert_eq!(hist.total(), 16);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod error;
pub mod histogram;
pub mod image;
pub mod pixel;

pub use color::{gray_pixel, luma, luma_of, with_luma, YCbCr};
pub use error::{Error, Result};
pub use histogram::{Histogram, HistogramStats, BIN_COUNT};
pub use image::RgbImage;
pub use pixel::Rgb;

