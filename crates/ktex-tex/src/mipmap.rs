//! Mipmap chain generation.
//!
//! Every level is resampled straight from the source image rather than from
//! the previous level, then optionally premultiplied, then encoded.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use ktex_codec::{BlockCodec, CodecRegistry, PixelFormat};
use tracing::debug;

use crate::{Error, MipmapLevel, Result};

/// Dimensions of every level in a full chain, largest first.
///
/// Halves both axes (clamped at 1) until the larger one reaches 1, giving
/// `floor(log2(max(width, height))) + 1` levels.
pub fn chain_dimensions(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut width = width.max(1);
    let mut height = height.max(1);
    let mut dims = vec![(width, height)];

    while width.max(height) > 1 {
        width = (width >> 1).max(1);
        height = (height >> 1).max(1);
        dims.push((width, height));
    }

    dims
}

/// Scale the colour channels of RGBA pixels by their alpha, in place.
///
/// Each channel becomes `trunc(c * (a / 255))`; alpha is unchanged.
pub fn premultiply_alpha(rgba: &mut [u8]) {
    for pixel in rgba.chunks_exact_mut(4) {
        let alpha = pixel[3] as f32 / 255.0;
        pixel[0] = (pixel[0] as f32 * alpha) as u8;
        pixel[1] = (pixel[1] as f32 * alpha) as u8;
        pixel[2] = (pixel[2] as f32 * alpha) as u8;
    }
}

/// Builds encoded mipmap levels from a source image.
#[derive(Debug, Clone)]
pub struct MipmapBuilder<'a, C> {
    registry: &'a CodecRegistry<C>,
    format: PixelFormat,
    premultiply: bool,
    filter: FilterType,
}

impl<'a, C: BlockCodec> MipmapBuilder<'a, C> {
    /// Create a builder that encodes to `format` through `registry`.
    pub fn new(registry: &'a CodecRegistry<C>, format: PixelFormat) -> Self {
        Self {
            registry,
            format,
            premultiply: false,
            filter: FilterType::CatmullRom,
        }
    }

    /// Premultiply colour by alpha after resampling, before encoding.
    pub fn premultiply_alpha(mut self, premultiply: bool) -> Self {
        self.premultiply = premultiply;
        self
    }

    /// Resampling filter used for levels smaller than the source.
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Build one level of `width` x `height` from `source`.
    pub fn build_level(&self, source: &RgbaImage, width: u32, height: u32) -> Result<MipmapLevel> {
        let level_width = to_u16("width", width as usize)?;
        let level_height = to_u16("height", height as usize)?;
        let pitch = to_u16("pitch", self.format.pitch(width as usize))?;

        let mut rgba = if source.dimensions() == (width, height) {
            source.as_raw().clone()
        } else {
            imageops::resize(source, width, height, self.filter).into_raw()
        };

        if self.premultiply {
            premultiply_alpha(&mut rgba);
        }

        let payload = self
            .registry
            .encode(&rgba, width as usize, height as usize, self.format)?;

        debug!(
            format = %self.format,
            width,
            height,
            pitch,
            bytes = payload.len(),
            "built mipmap level"
        );

        Ok(MipmapLevel::new(level_width, level_height, pitch, payload))
    }

    /// Build level 0 only, or the full chain down to 1x1.
    pub fn build_chain(&self, source: &RgbaImage, generate_mipmaps: bool) -> Result<Vec<MipmapLevel>> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let dims = if generate_mipmaps {
            chain_dimensions(width, height)
        } else {
            vec![(width, height)]
        };

        self.build_levels(source, &dims)
    }

    #[cfg(not(feature = "parallel"))]
    fn build_levels(&self, source: &RgbaImage, dims: &[(u32, u32)]) -> Result<Vec<MipmapLevel>> {
        dims.iter()
            .map(|&(w, h)| self.build_level(source, w, h))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn build_levels(&self, source: &RgbaImage, dims: &[(u32, u32)]) -> Result<Vec<MipmapLevel>> {
        use rayon::prelude::*;

        dims.par_iter()
            .map(|&(w, h)| self.build_level(source, w, h))
            .collect()
    }
}

fn to_u16(field: &'static str, value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::DimensionOverflow { field, value })
}
