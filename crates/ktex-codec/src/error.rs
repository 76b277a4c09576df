//! Error types for the codec registry.

use thiserror::Error;

/// Errors raised by pixel format lookup and block encode/decode.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested pixel format identifier is not DXT1, DXT3, DXT5 or ARGB.
    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(u32),

    /// Raw RGBA input is not `width * height * 4` bytes.
    #[error("raw RGBA size mismatch: expected {expected} bytes, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },

    /// Encoded payload is not the storage requirement for its dimensions.
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch { expected: usize, actual: usize },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
