//! # rasterkit-io
//!
//! Loading and saving [`RgbImage`]s.
//!
//! | Format | Read | Write | Feature |
//! |--------|------|-------|---------|
//! | PNG    | 8/16-bit, gray, palette, alpha | 8-bit RGB | `png` |
//! | JPEG   | RGB, gray, CMYK | RGB | `jpeg` |
//!
//! Everything is converted to 8-bit RGB on load; alpha is discarded.
//!
//! # Example
//!
//! ```rust,ignore
//! use rasterkit_io::{read, write};
//!
//! let image = read("input.jpg")?;
//! write("output.png", &image)?;
//! ```

#![warn(missing_docs)]

mod error;

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use error::{IoError, IoResult};
pub use rasterkit_core::RgbImage;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable Network Graphics.
    Png,
    /// JPEG/JFIF.
    Jpeg,
    /// Anything else.
    Unknown,
}

impl Format {
    /// Detects the format of a file, by magic bytes first and extension
    /// second.
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let mut header = [0u8; 8];
        let n = File::open(path)?.read(&mut header)?;
        match Self::from_bytes(&header[..n]) {
            Format::Unknown => Ok(Self::from_extension(path)),
            format => Ok(format),
        }
    }

    /// Format implied by the file extension.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") | Some("jpe") => Format::Jpeg,
            _ => Format::Unknown,
        }
    }

    /// Format identified by its magic number.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Format::Png
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Format::Jpeg
        } else {
            Format::Unknown
        }
    }
}

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}

/// Reads an image, detecting the format from content and extension.
///
/// # Errors
///
/// - [`IoError::Io`] if the file cannot be opened
/// - [`IoError::UnsupportedFormat`] for unknown formats
/// - [`IoError::DecodeError`] for corrupt files
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    debug!(path = %path.display(), ?format, "reading image");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),

        _ => Err(unsupported(path)),
    }
}

/// Writes an image, choosing the format from the file extension.
///
/// # Errors
///
/// - [`IoError::UnsupportedFormat`] for unknown extensions
/// - [`IoError::Io`] / [`IoError::EncodeError`] on write failure
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    debug!(path = %path.display(), ?format, "writing image");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write(path, image),

        _ => Err(unsupported(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("a/b.PNG"), Format::Png);
        assert_eq!(Format::from_extension("x.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("x.tiff"), Format::Unknown);
        assert_eq!(Format::from_extension("noext"), Format::Unknown);
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(Format::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Format::Jpeg);
        assert_eq!(Format::from_bytes(b"\x89PNG\r\n\x1a\n"), Format::Png);
        assert_eq!(Format::from_bytes(b"GIF8"), Format::Unknown);
    }
}
