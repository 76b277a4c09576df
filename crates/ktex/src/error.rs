//! Error types for the conversion, load and export pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when converting, loading or exporting textures.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container, codec or mipmap error.
    #[error("{0}")]
    Tex(#[from] ktex_tex::Error),

    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A region lies entirely outside the raster.
    #[error("region '{name}' does not overlap the image")]
    EmptyRegion { name: String },

    /// Decoded pixels do not fill the declared raster.
    #[error("decoded raster is not {width}x{height} RGBA")]
    InvalidRaster { width: u32, height: u32 },

    /// An input path has no usable file name.
    #[error("cannot derive an output name from {0}")]
    InvalidInput(PathBuf),
}

impl From<ktex_codec::Error> for Error {
    fn from(err: ktex_codec::Error) -> Self {
        Error::Tex(err.into())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
