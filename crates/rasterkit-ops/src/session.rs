//! Editing session: one source image, one working result.
//!
//! A [`Session`] holds the image loaded by the user (`source`, never
//! modified afterwards) and the result of the most recent operation
//! (`working`). Every operator reads `source` and overwrites `working`, so
//! operators never stack: changing a slider and re-applying gives the same
//! result as applying once.
//!
//! Observers registered with [`Session::subscribe`] are called exactly once
//! after each successful operation, with the new working image. Failed
//! operations leave `working` untouched and notify nobody.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use rasterkit_core::{Rgb, RgbImage};
//! use rasterkit_ops::{OpsError, Session};
//!
//! let mut session = Session::new();
//! assert!(matches!(session.grayscale(), Err(OpsError::NoImageLoaded)));
//!
//! let updates = Rc::new(Cell::new(0));
//! let counter = updates.clone();
//! session.subscribe(move |_img: &RgbImage| counter.set(counter.get() + 1));
//!
//! session.load(RgbImage::filled(4, 4, Rgb::new(200, 30, 30)));
//! session.grayscale().unwrap();
//! assert_eq!(updates.get(), 2);
//! ```

use std::fmt;

use rasterkit_core::{Histogram, RgbImage};
use tracing::info;

use crate::border::BorderStrategy;
use crate::canny::{canny, CannyParams};
use crate::filter::{self, FilterMode};
use crate::kernel::Kernel;
use crate::pixel_ops;
use crate::tone;
use crate::unsharp::{unsharp_mask, UnsharpParams};
use crate::{OpsError, OpsResult};

/// Receives the working image after every successful operation.
pub trait ImageObserver {
    /// Called with the freshly written working image.
    fn image_updated(&mut self, image: &RgbImage);
}

impl<F> ImageObserver for F
where
    F: FnMut(&RgbImage),
{
    fn image_updated(&mut self, image: &RgbImage) {
        self(image)
    }
}

struct Loaded {
    source: RgbImage,
    working: RgbImage,
    source_histogram: Histogram,
}

/// Interactive editing state.
#[derive(Default)]
pub struct Session {
    loaded: Option<Loaded>,
    border: BorderStrategy,
    observers: Vec<Box<dyn ImageObserver>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("dimensions", &self.loaded.as_ref().map(|l| l.source.dimensions()))
            .field("border", &self.border)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Session {
    /// Creates an empty session with the default (`Pad`) border.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session with the given border strategy.
    pub fn with_border(border: BorderStrategy) -> Self {
        Self {
            border,
            ..Self::default()
        }
    }

    /// Registers an observer.
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: ImageObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Replaces the source image, resets `working` to a copy and notifies.
    pub fn load(&mut self, image: RgbImage) -> &RgbImage {
        let source_histogram = Histogram::from_image(&image);
        info!(
            width = image.width(),
            height = image.height(),
            mean = source_histogram.mean(),
            "image loaded"
        );
        let working = image.clone();
        let state = self.loaded.insert(Loaded {
            source: image,
            working,
            source_histogram,
        });
        for obs in self.observers.iter_mut() {
            obs.image_updated(&state.working);
        }
        &state.working
    }

    /// Whether an image is loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn state(&self) -> OpsResult<&Loaded> {
        self.loaded.as_ref().ok_or(OpsError::NoImageLoaded)
    }

    /// The image as loaded.
    pub fn source(&self) -> OpsResult<&RgbImage> {
        Ok(&self.state()?.source)
    }

    /// The result of the last operation (the source right after loading).
    pub fn working(&self) -> OpsResult<&RgbImage> {
        Ok(&self.state()?.working)
    }

    /// Histogram of the source, computed once at load time.
    pub fn source_histogram(&self) -> OpsResult<&Histogram> {
        Ok(&self.state()?.source_histogram)
    }

    /// Histogram of the current working image, computed on demand.
    pub fn working_histogram(&self) -> OpsResult<Histogram> {
        Ok(Histogram::from_image(&self.state()?.working))
    }

    /// Current border strategy.
    pub fn border(&self) -> BorderStrategy {
        self.border
    }

    /// Sets the border strategy used by subsequent filtering operations.
    pub fn set_border(&mut self, border: BorderStrategy) {
        info!(%border, "border strategy changed");
        self.border = border;
    }

    /// Restores `working` to the source image.
    pub fn reset(&mut self) -> OpsResult<&RgbImage> {
        let out = self.state()?.source.clone();
        info!("working image reset");
        self.commit(out)
    }

    /// Converts to gray at each pixel's luma.
    pub fn grayscale(&mut self) -> OpsResult<&RgbImage> {
        let out = pixel_ops::grayscale(&self.state()?.source);
        info!("converted to grayscale");
        self.commit(out)
    }

    /// Reduces every channel to `bits` bits.
    pub fn quantize(&mut self, bits: u8) -> OpsResult<&RgbImage> {
        let out = pixel_ops::quantize(&self.state()?.source, bits)?;
        info!(bits, "quantized");
        self.commit(out)
    }

    /// Draws the red diagonal cross.
    pub fn draw_cross(&mut self, percent: u32) -> OpsResult<&RgbImage> {
        let out = pixel_ops::draw_cross(&self.state()?.source, percent)?;
        info!(percent, "drew red cross");
        self.commit(out)
    }

    /// Shifts luma by `delta`.
    pub fn brightness(&mut self, delta: i32) -> OpsResult<&RgbImage> {
        let out = tone::brightness(&self.state()?.source, delta);
        info!(delta, "changed brightness");
        self.commit(out)
    }

    /// Scales luma around the source median.
    pub fn contrast(&mut self, factor: f64) -> OpsResult<&RgbImage> {
        let state = self.state()?;
        let out = tone::contrast_with_histogram(&state.source, &state.source_histogram, factor)?;
        info!(factor, "changed contrast");
        self.commit(out)
    }

    /// Percentile stretch with clip fraction `clip`.
    pub fn robust_contrast(&mut self, clip: f64) -> OpsResult<&RgbImage> {
        let state = self.state()?;
        let out = tone::robust_contrast_with_histogram(&state.source, &state.source_histogram, clip)?;
        info!(clip, "changed robust contrast");
        self.commit(out)
    }

    /// Convolves with `kernel`.
    pub fn apply_filter(&mut self, kernel: &Kernel, mode: FilterMode) -> OpsResult<&RgbImage> {
        let filtered = filter::convolve(&self.state()?.source, kernel, self.border, mode)?;
        info!(
            kernel = %kernel,
            response = ?filtered.response,
            separable = filtered.separable,
            border = %self.border,
            "applied filter"
        );
        self.commit(filtered.image)
    }

    /// Gaussian blur.
    pub fn gaussian_blur(&mut self, sigma: f64) -> OpsResult<&RgbImage> {
        let out = filter::gaussian_blur(&self.state()?.source, sigma, self.border)?;
        info!(sigma, border = %self.border, "applied gaussian filter");
        self.commit(out)
    }

    /// Canny edge detection; `working` becomes the binary edge image.
    pub fn canny(&mut self, params: &CannyParams) -> OpsResult<&RgbImage> {
        let out = canny(&self.state()?.source, params, self.border)?;
        info!(
            sigma = params.sigma,
            t_low = params.t_low,
            t_high = params.t_high,
            edges = out.edges.edge_count(),
            "applied canny"
        );
        self.commit(out.image)
    }

    /// Unsharp masking.
    pub fn unsharp_mask(&mut self, params: &UnsharpParams) -> OpsResult<&RgbImage> {
        let out = unsharp_mask(&self.state()?.source, params, self.border)?;
        info!(
            sigma = params.sigma,
            sharpness = params.sharpness,
            threshold = params.threshold,
            "applied unsharp mask"
        );
        self.commit(out)
    }

    /// Stores `image` as the working image and notifies observers.
    fn commit(&mut self, image: RgbImage) -> OpsResult<&RgbImage> {
        let state = self.loaded.as_mut().ok_or(OpsError::NoImageLoaded)?;
        state.working = image;
        for obs in self.observers.iter_mut() {
            obs.image_updated(&state.working);
        }
        Ok(&state.working)
    }
}
