//! Owned RGB image buffer.
//!
//! [`RgbImage`] stores pixels row-major with the origin at the top-left.
//! Both dimensions are always at least 1.

use crate::error::{Error, Result};
use crate::pixel::Rgb;

/// Row-major grid of [`Rgb`] pixels.
///
/// # Example
///
/// ```rust
/// use rasterkit_core::{Rgb, RgbImage};
///
/// let mut img = RgbImage::new(8, 4).unwrap();
/// img.set_pixel(2, 1, Rgb::RED).unwrap();
/// assert_eq!(img.pixel(2, 1), Rgb::RED);
/// assert_eq!(img.get_pixel(8, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl RgbImage {
    /// Creates a black image.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::check_dims(width, height)?;
        Ok(Self::filled_unchecked(width, height, Rgb::BLACK))
    }

    /// Creates an image with every pixel set to `px`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Use [`RgbImage::new`] for
    /// dimensions that are not known to be valid.
    pub fn filled(width: u32, height: u32, px: Rgb) -> Self {
        assert!(
            width > 0 && height > 0,
            "RgbImage::filled: dimensions must be non-zero, got {width}x{height}"
        );
        Self::filled_unchecked(width, height, px)
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Rgb,
    {
        Self::check_dims(width, height)?;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Ok(Self { width, height, pixels })
    }

    /// Wraps an interleaved `RGBRGB...` byte buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if a dimension is zero or
    /// `data.len() != width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::check_dims(width, height)?;
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        let pixels = data
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self { width, height, pixels })
    }

    /// Wraps an existing pixel vector.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if a dimension is zero or the vector
    /// length doesn't match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        Self::check_dims(width, height)?;
        if pixels.len() != width as usize * height as usize {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} pixels, got {}", width as usize * height as usize, pixels.len()),
            ));
        }
        Ok(Self { width, height, pixels })
    }

    fn filled_unchecked(width: u32, height: u32, px: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![px; width as usize * height as usize],
        }
    }

    fn check_dims(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height, "width and height must be non-zero"));
        }
        Ok(())
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Returns `true` if `(x, y)` addresses a pixel of this image.
    ///
    /// Takes signed coordinates so callers can probe neighbor positions
    /// without casting first.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds. Use
    /// [`get_pixel`](Self::get_pixel) for a checked lookup.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[self.index(x, y)]
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Writes the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the coordinates are outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgb) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        let idx = self.index(x, y);
        self.pixels[idx] = px;
        Ok(())
    }

    /// Pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Mutable pixels in row-major order.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// One row of pixels.
    #[inline]
    pub fn row(&self, y: u32) -> &[Rgb] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Interleaved `RGBRGB...` bytes.
    pub fn as_raw(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Consumes the image, returning its interleaved bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.as_raw()
    }

    /// Builds a same-sized image by mapping every pixel.
    pub fn map_pixels<F: FnMut(Rgb) -> Rgb>(&self, f: F) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().copied().map(f).collect(),
        }
    }

}
