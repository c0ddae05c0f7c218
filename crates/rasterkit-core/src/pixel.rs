//! 8-bit RGB pixel type.
//!
//! [`Rgb`] is the only pixel type rasterkit works with: three unsigned
//! 8-bit channels, no alpha. It is `#[repr(C)]` so a `&[Rgb]` has the same
//! layout as the interleaved `[R G B R G B ...]` byte buffer of
//! [`RgbImage`](crate::RgbImage).

use std::fmt;

/// RGB pixel with 8 bits per channel.
///
/// # Example
///
/// ```rust
/// use rasterkit_core::Rgb;
///
/// let red = Rgb::new(255, 0, 0);
/// assert_eq!(red, Rgb::RED);
/// assert_eq!(Rgb::gray(7).to_array(), [7, 7, 7]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Opaque black, also the color of padded border samples.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// White, used for edge pixels in binary edge maps.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Pure red, used by the cross overlay.
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    /// Creates a pixel from its three channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates an achromatic pixel with all channels set to `v`.
    #[inline]
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Builds a pixel from signed channel values, clamping each to `[0, 255]`.
    #[inline]
    pub fn from_clamped(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: r.clamp(0, 255) as u8,
            g: g.clamp(0, 255) as u8,
            b: b.clamp(0, 255) as u8,
        }
    }

    /// Returns the channels as an array.
    #[inline]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Creates a pixel from a channel array.
    #[inline]
    pub const fn from_array(arr: [u8; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Applies `f` to each channel.
    #[inline]
    pub fn map<F: Fn(u8) -> u8>(self, f: F) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Largest per-channel absolute difference to `other`.
    #[inline]
    pub fn max_channel_diff(self, other: Rgb) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }

    /// Returns `true` if all three channels are equal.
    #[inline]
    pub fn is_gray(self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(arr: [u8; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(px: Rgb) -> Self {
        px.to_array()
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_clamped() {
        assert_eq!(Rgb::from_clamped(-5, 300, 17), Rgb::new(0, 255, 17));
    }

    #[test]
    fn test_max_channel_diff() {
        let a = Rgb::new(10, 200, 30);
        let b = Rgb::new(12, 195, 30);
        assert_eq!(a.max_channel_diff(b), 5);
        assert_eq!(b.max_channel_diff(a), 5);
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(Rgb::new(255, 16, 0).to_string(), "#ff1000");
        assert!(Rgb::gray(3).is_gray());
        assert!(!Rgb::RED.is_gray());
    }

    #[test]
    fn test_layout_matches_bytes() {
        assert_eq!(std::mem::size_of::<Rgb>(), 3);
        assert_eq!(std::mem::align_of::<Rgb>(), 1);
    }
}
