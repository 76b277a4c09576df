//! Error types for TEX container handling.

use thiserror::Error;

/// Errors that can occur when building, reading or writing TEX containers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pixel format or codec error.
    #[error("{0}")]
    Codec(#[from] ktex_codec::Error),

    /// Image resampling or pixel buffer error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The stream ended before the declared header, directory or payloads.
    #[error("truncated TEX container: needed {needed} bytes but only {available} available")]
    TruncatedContainer { needed: u64, available: u64 },

    /// Header values that cannot describe a valid container.
    #[error("malformed TEX header: {0}")]
    MalformedHeader(String),

    /// A level's payload does not match the storage requirement for its size.
    #[error("mipmap {level} payload size mismatch: expected {expected} bytes, got {actual}")]
    LevelSizeMismatch {
        level: usize,
        expected: usize,
        actual: usize,
    },

    /// A dimension or pitch does not fit the 16-bit directory fields.
    #[error("{field} {value} does not fit in a 16-bit directory entry")]
    DimensionOverflow { field: &'static str, value: usize },

    /// Requested mipmap index is past the end of the chain.
    #[error("mipmap index {index} out of range (container has {count} levels)")]
    MipmapOutOfRange { index: usize, count: usize },

    /// Source image has a zero dimension.
    #[error("cannot build mipmaps for a {width}x{height} image")]
    InvalidDimensions { width: u32, height: u32 },

    /// A container must hold at least one mipmap level.
    #[error("TEX container has no mipmap levels")]
    EmptyContainer,
}

impl From<ktex_common::Error> for Error {
    fn from(err: ktex_common::Error) -> Self {
        match err {
            ktex_common::Error::UnexpectedEof { needed, available } => Error::TruncatedContainer {
                needed: needed as u64,
                available: available as u64,
            },
        }
    }
}

/// Result type for TEX operations.
pub type Result<T> = std::result::Result<T, Error>;
