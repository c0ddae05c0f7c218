//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File extension or content not recognized.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Pixel layout the reader cannot convert to 8-bit RGB.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Decoded data did not form a valid image.
    #[error(transparent)]
    Core(#[from] rasterkit_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
