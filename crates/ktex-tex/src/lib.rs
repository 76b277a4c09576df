//! TEX texture container handling.
//!
//! A TEX file is a small fixed header, a directory with one entry per mipmap
//! level, and the encoded level payloads back to back:
//!
//! - [`TexContainer`] reads and writes that layout
//! - [`MipmapBuilder`] turns an RGBA image into encoded levels
//!
//! Pixel data is stored bottom row first. [`TexContainer`] does not flip
//! anything; flip the source before building and the decoded level after.
//!
//! # Example
//!
//! ```
//! use image::RgbaImage;
//! use ktex_codec::{CodecRegistry, PixelFormat, Quality};
//! use ktex_tex::{MipmapBuilder, TexContainer, TexHeader, TextureType};
//!
//! let registry = CodecRegistry::with_quality(Quality::Fast);
//! let source = RgbaImage::new(64, 32);
//!
//! let levels = MipmapBuilder::new(&registry, PixelFormat::Dxt1).build_chain(&source, true)?;
//! let container = TexContainer::new(TexHeader::new(PixelFormat::Dxt1, TextureType::TwoD), levels)?;
//! assert_eq!(container.mip_count(), 7);
//!
//! let bytes = container.to_bytes()?;
//! assert_eq!(TexContainer::parse(&bytes)?, container);
//! # Ok::<(), ktex_tex::Error>(())
//! ```

mod container;
mod error;
mod header;
mod mipmap;

pub use container::{MipmapLevel, TexContainer};
pub use error::{Error, Result};
pub use header::{Platform, RawTexHeader, TexHeader, TextureType, DIRECTORY_ENTRY_SIZE};
pub use mipmap::{chain_dimensions, premultiply_alpha, MipmapBuilder};

pub use image::imageops::FilterType;
