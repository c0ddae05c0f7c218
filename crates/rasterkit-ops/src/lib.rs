//! # rasterkit-ops
//!
//! Image processing operators for 8-bit RGB images.
//!
//! Every operator works on the luma channel of an immutable source image
//! and returns a new image of the same size.
//!
//! # Modules
//!
//! - [`border`] - Out-of-range pixel extrapolation
//! - [`kernel`] - Convolution kernels and SVD separation
//! - [`filter`] - Convolution engine, Gaussian blur, gradient
//! - [`tone`] - Brightness, contrast, robust contrast
//! - [`pixel_ops`] - Grayscale, quantization, cross overlay
//! - [`canny`] - Canny edge detection
//! - [`unsharp`] - Unsharp masking
//! - [`session`] - Source/working image state with change notification
//! - [`params`] - Parameter defaults and input ranges
//!
//! # Example
//!
//! ```rust
//! use rasterkit_core::{Rgb, RgbImage};
//! use rasterkit_ops::filter::{convolve, FilterMode};
//! use rasterkit_ops::{BorderStrategy, Kernel};
//!
//! let img = RgbImage::from_fn(16, 16, |x, y| Rgb::gray(((x * y) % 256) as u8)).unwrap();
//! let kernel: Kernel = "-1,0,1;-2,0,2;-1,0,1".parse().unwrap();
//! let edges = convolve(&img, &kernel, BorderStrategy::Mirror, FilterMode::Auto).unwrap();
//! assert_eq!(edges.image.dimensions(), (16, 16));
//! ```
//!
//! # Common Operations
//!
//! ## Blur and sharpen
//!
//! ```rust,ignore
//! use rasterkit_ops::filter::gaussian_blur;
//! use rasterkit_ops::unsharp::{unsharp_mask, UnsharpParams};
//!
//! let soft = gaussian_blur(&image, 2.0, BorderStrategy::Clamp)?;
//! let crisp = unsharp_mask(&image, &UnsharpParams::default(), BorderStrategy::Clamp)?;
//! ```
//!
//! ## Edges
//!
//! ```rust,ignore
//! use rasterkit_ops::canny::{canny, CannyParams};
//!
//! let out = canny(&image, &CannyParams::default(), BorderStrategy::Pad)?;
//! println!("{} edge pixels", out.edges.edge_count());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod border;
pub mod canny;
pub mod filter;
pub mod kernel;
pub mod params;
pub mod pixel_ops;
pub mod session;
pub mod tone;
pub mod unsharp;

pub use border::BorderStrategy;
pub use canny::{CannyOutput, CannyParams, EdgeMap};
pub use error::{OpsError, OpsResult};
pub use filter::{FilterMode, Filtered, GradientField, Response};
pub use kernel::{Kernel, SeparableKernel};
pub use session::{ImageObserver, Session};
pub use unsharp::UnsharpParams;
