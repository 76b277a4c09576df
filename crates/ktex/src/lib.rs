//! ktex - TEX block-compressed texture conversion and inspection.
//!
//! This crate ties the ktex crates together and adds the file-level
//! pipeline: raster to `.tex`, `.tex` to raster, and PNG export of whole
//! textures or atlas regions.
//!
//! # Crates
//!
//! - [`ktex_common`] - Bounds-checked binary reading
//! - [`ktex_codec`] - Pixel formats and DXT block codecs
//! - [`ktex_tex`] - TEX container format and mipmap generation
//! - [`ktex_atlas`] - Sprite atlas sidecar parsing
//!
//! # Example
//!
//! ```no_run
//! use ktex::prelude::*;
//!
//! let options = ConversionOptions::default()
//!     .pixel_format(PixelFormat::Dxt1)
//!     .generate_mipmaps(true);
//! convert_raster_to_container("button.png", "button.tex", options)?;
//!
//! let loaded = load_container("button.tex")?;
//! println!("{}", loaded.info);
//! export_raster(&loaded.image, "button_roundtrip.png")?;
//! # Ok::<(), ktex::Error>(())
//! ```

mod convert;
mod error;
mod export;
mod load;
mod options;

use std::path::Path;

pub use convert::{output_path, BatchOutcome, Converter, TEX_EXTENSION};
pub use error::{Error, Result};
pub use export::{crop_region, export_atlas, export_raster, export_region, sanitize_file_name, ElementExport};
pub use load::{decode_main_image, load_bytes, load_container, LoadedTexture, TexInfo, SIDECAR_EXTENSION};
pub use options::ConversionOptions;

// Re-export all sub-crates
pub use ktex_atlas as atlas;
pub use ktex_codec as codec;
pub use ktex_common as common;
pub use ktex_tex as tex;

/// Convert the image at `source` into a TEX container at `destination`.
pub fn convert_raster_to_container(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: ConversionOptions,
) -> Result<()> {
    Converter::new(options).convert_file(source, destination)
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        convert_raster_to_container, export_atlas, export_raster, export_region, load_container,
        BatchOutcome, ConversionOptions, Converter, LoadedTexture, TexInfo,
    };
    pub use ktex_atlas::{AtlasElement, AtlasParse, AtlasWarning, PixelRect, UvRect};
    pub use ktex_codec::{CodecRegistry, PixelFormat, Quality};
    pub use ktex_tex::{MipmapBuilder, MipmapLevel, Platform, TexContainer, TexHeader, TextureType};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
