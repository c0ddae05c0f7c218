//! JPEG format support.
//!
//! Decoding goes through `jpeg-decoder`, encoding through `jpeg-encoder`.
//! Grayscale, 16-bit grayscale and CMYK inputs are converted to 8-bit RGB.
//!
//! # Example
//!
//! ```rust,ignore
//! use rasterkit_io::jpeg;
//!
//! let image = jpeg::read("photo.jpg")?;
//! jpeg::write_with_quality("small.jpg", &image, 75)?;
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rasterkit_core::RgbImage;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Quality used by [`write`].
pub const DEFAULT_QUALITY: u8 = 90;

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let file = File::open(path.as_ref())?;
    decode(file)
}

/// Decodes a JPEG stream.
pub fn decode<R: Read>(reader: R) -> IoResult<RgbImage> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(reader));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;
    trace!(width = info.width, height = info.height, format = ?info.pixel_format, "jpeg frame");

    let rgb: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|l16| [l16[0], l16[0], l16[0]])
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let k = 1.0 - cmyk[3] as f32 / 255.0;
                let ch = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0) as u8;
                [ch(cmyk[0]), ch(cmyk[1]), ch(cmyk[2])]
            })
            .collect(),
    };

    Ok(RgbImage::from_raw(info.width as u32, info.height as u32, &rgb)?)
}

/// Writes a JPEG at [`DEFAULT_QUALITY`].
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    write_with_quality(path, image, DEFAULT_QUALITY)
}

/// Writes a JPEG at the given quality (1-100).
pub fn write_with_quality<P: AsRef<Path>>(path: P, image: &RgbImage, quality: u8) -> IoResult<()> {
    let data = encode(image, quality)?;
    std::fs::write(path.as_ref(), data)?;
    Ok(())
}

/// Encodes an image to JPEG bytes.
///
/// # Errors
///
/// [`IoError::EncodeError`] if a dimension exceeds 65535 or the encoder
/// fails.
pub fn encode(image: &RgbImage, quality: u8) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    let (w, h) = image.dimensions();
    let (w16, h16) = match (u16::try_from(w), u16::try_from(h)) {
        (Ok(w16), Ok(h16)) => (w16, h16),
        _ => {
            return Err(IoError::EncodeError(format!(
                "{w}x{h} exceeds the JPEG size limit of 65535"
            )));
        }
    };

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode(&image.as_raw(), w16, h16, ColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
    debug!(bytes = buffer.len(), quality, "jpeg encoded");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_core::Rgb;

    #[test]
    fn test_memory_roundtrip() {
        let img = RgbImage::filled(24, 16, Rgb::new(90, 140, 200));
        let bytes = encode(&img, 95).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
        let back = decode(bytes.as_slice()).unwrap();
        assert_eq!(back.dimensions(), (24, 16));
        // flat color survives lossy coding almost exactly
        assert!(back.pixels().iter().all(|p| p.max_channel_diff(img.pixel(0, 0)) <= 4));
    }

    #[test]
    fn test_quality_affects_size() {
        let img = RgbImage::from_fn(64, 64, |x, y| Rgb::new((x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8)).unwrap();
        let high = encode(&img, 98).unwrap();
        let low = encode(&img, 20).unwrap();
        assert!(low.len() < high.len());
    }
}
