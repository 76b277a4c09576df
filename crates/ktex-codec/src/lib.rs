//! Pixel formats and block codecs for TEX textures.
//!
//! Every TEX container stores its mipmaps in one of four pixel formats:
//!
//! | Format | Storage |
//! |--------|---------|
//! | DXT1 (BC1) | 8 bytes per 4x4 block |
//! | DXT3 (BC2) | 16 bytes per 4x4 block |
//! | DXT5 (BC3) | 16 bytes per 4x4 block |
//! | ARGB | 4 bytes per pixel, R, G, B, A order |
//!
//! [`CodecRegistry`] turns raw RGBA into payloads and back. The DXT bit
//! packing itself is delegated to a [`BlockCodec`]; [`SquishCodec`] is the
//! default.
//!
//! # Example
//!
//! ```
//! use ktex_codec::{CodecRegistry, PixelFormat, Quality};
//!
//! let registry = CodecRegistry::with_quality(Quality::Fast);
//! let rgba = vec![255u8; 8 * 8 * 4];
//!
//! let payload = registry.encode(&rgba, 8, 8, PixelFormat::Dxt5)?;
//! assert_eq!(payload.len(), PixelFormat::Dxt5.storage_requirement(8, 8));
//!
//! let decoded = registry.decode(&payload, 8, 8, PixelFormat::Dxt5)?;
//! assert_eq!(decoded.len(), rgba.len());
//! # Ok::<(), ktex_codec::Error>(())
//! ```

mod codec;
mod error;
mod format;
mod registry;

pub use codec::{BlockCodec, Quality, SquishCodec};
pub use error::{Error, Result};
pub use format::{FormatInfo, PixelFormat};
pub use registry::{CodecRegistry, BLOCK_RGBA_BYTES};
