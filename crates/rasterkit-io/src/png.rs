//! PNG format support.
//!
//! Reads any PNG the `png` crate can decode and reduces it to 8-bit RGB:
//! palettes and low bit depths are expanded, gray is replicated to three
//! channels, alpha is dropped, and 16-bit samples keep their high byte.
//! Writes 8-bit RGB.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, Write};
use std::path::Path;

use rasterkit_core::RgbImage;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Reads a PNG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Decodes a PNG from a buffered, seekable reader.
pub fn decode<R: BufRead + Seek>(reader: R) -> IoResult<RgbImage> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let data = &buf[..info.buffer_size()];
    trace!(
        width = info.width,
        height = info.height,
        color = ?info.color_type,
        depth = ?info.bit_depth,
        "png frame"
    );

    let bytes_per_sample = match info.bit_depth {
        png::BitDepth::Eight => 1,
        png::BitDepth::Sixteen => 2,
        depth => {
            return Err(IoError::UnsupportedBitDepth(format!("{:?}", depth)));
        }
    };
    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!("{:?} {:?}", other, info.bit_depth)));
        }
    };

    // big-endian samples: the first byte is the high byte
    let rgb: Vec<u8> = data
        .chunks_exact(channels * bytes_per_sample)
        .flat_map(|px| {
            let s = |c: usize| px[c * bytes_per_sample];
            if channels < 3 {
                [s(0), s(0), s(0)]
            } else {
                [s(0), s(1), s(2)]
            }
        })
        .collect();

    Ok(RgbImage::from_raw(info.width, info.height, &rgb)?)
}

/// Writes an 8-bit RGB PNG.
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    encode(BufWriter::new(file), image)
}

/// Encodes an 8-bit RGB PNG into any writer.
pub fn encode<W: Write>(writer: W, image: &RgbImage) -> IoResult<()> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .write_image_data(&image.as_raw())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .finish()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_core::Rgb;
    use std::io::Cursor;

    #[test]
    fn test_memory_roundtrip() {
        let img = RgbImage::from_fn(17, 5, |x, y| Rgb::new(x as u8 * 15, y as u8 * 50, 7)).unwrap();
        let mut bytes = Vec::new();
        encode(&mut bytes, &img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let back = decode(Cursor::new(bytes)).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode(Cursor::new(b"definitely not a png".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }
}
