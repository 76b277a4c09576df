//! Conversion settings.

use ktex_codec::{PixelFormat, Quality};
use ktex_tex::TextureType;

/// Settings for turning a raster into a TEX container.
///
/// The default is a single DXT5 2D level, straight alpha, balanced quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConversionOptions {
    pub pixel_format: PixelFormat,
    pub texture_type: TextureType,
    pub generate_mipmaps: bool,
    pub premultiply_alpha: bool,
    pub quality: Quality,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Dxt5,
            texture_type: TextureType::TwoD,
            generate_mipmaps: false,
            premultiply_alpha: false,
            quality: Quality::Balanced,
        }
    }
}

impl ConversionOptions {
    pub fn pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    pub fn texture_type(mut self, texture_type: TextureType) -> Self {
        self.texture_type = texture_type;
        self
    }

    pub fn generate_mipmaps(mut self, generate: bool) -> Self {
        self.generate_mipmaps = generate;
        self
    }

    pub fn premultiply_alpha(mut self, premultiply: bool) -> Self {
        self.premultiply_alpha = premultiply;
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConversionOptions::default();
        assert_eq!(options.pixel_format, PixelFormat::Dxt5);
        assert_eq!(options.texture_type, TextureType::TwoD);
        assert!(!options.generate_mipmaps);
        assert!(!options.premultiply_alpha);
        assert_eq!(options.quality, Quality::Balanced);
    }

    #[test]
    fn test_builder_chain() {
        let options = ConversionOptions::default()
            .pixel_format(PixelFormat::Dxt1)
            .generate_mipmaps(true);
        assert_eq!(options.pixel_format, PixelFormat::Dxt1);
        assert!(options.generate_mipmaps);
        assert_eq!(options.texture_type, TextureType::TwoD);
    }
}
