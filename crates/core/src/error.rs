//! Error types for icon rendering and encoding.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while rendering, encoding or reading icon files
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pixel buffer length does not match the declared dimensions
    #[error("pixel buffer holds {actual} bytes, expected {expected} for the declared dimensions")]
    BufferSize { expected: usize, actual: usize },

    /// Chunk type tag is not exactly four ASCII letters
    #[error("invalid chunk type {0:?}: must be exactly 4 ASCII letters")]
    InvalidChunkType(String),

    /// Requested output size is not a positive integer
    #[error("invalid icon size {0}: must be at least 1 pixel")]
    InvalidSize(u32),

    /// The deflate compressor reported a failure
    #[error("compression failed: {0}")]
    Compression(String),

    /// The output sink rejected an encoded image
    #[error("sink rejected {size}x{size} image: {message}")]
    Sink { size: u32, message: String },

    /// Size cannot be stored in an ICO directory entry
    #[error("icon size {0} cannot be stored in an ICO file (1..=256)")]
    IcoSize(u32),

    /// Input is not a well-formed file of the expected kind
    #[error("malformed PNG: {0}")]
    Malformed(String),
}
