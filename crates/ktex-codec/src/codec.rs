//! Block compression backends.
//!
//! The registry only needs whole-image compress and decompress for the three
//! DXT formats. Anything that can do that implements [`BlockCodec`]; the
//! default backend is [`SquishCodec`], built on texpresso.

use std::fmt;

use crate::PixelFormat;

/// Quality preset handed to the block compressor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Quality {
    /// Range fit. Fastest, lowest quality.
    Fast,
    /// Cluster fit.
    #[default]
    Balanced,
    /// Iterative cluster fit. Slowest, best quality.
    High,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::High => "high",
        })
    }
}

/// A DXT block compressor.
///
/// Callers guarantee:
/// - `format` is compressed (never [`PixelFormat::Argb`]);
/// - `rgba` is exactly `width * height * 4` bytes, dimensions need not be
///   multiples of 4;
/// - `blocks` / `output` are exactly `format.storage_requirement(width, height)`
///   bytes when compressing / decompressing respectively.
pub trait BlockCodec: Send + Sync {
    /// Compress a raw RGBA image into `output`.
    fn compress(&self, format: PixelFormat, rgba: &[u8], width: usize, height: usize, output: &mut [u8]);

    /// Decompress `blocks` into `output` as raw RGBA.
    fn decompress(&self, format: PixelFormat, blocks: &[u8], width: usize, height: usize, output: &mut [u8]);
}

/// texpresso-backed codec (a Rust port of libsquish).
#[derive(Debug, Clone, Copy, Default)]
pub struct SquishCodec {
    quality: Quality,
}

impl SquishCodec {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    fn params(&self) -> texpresso::Params {
        let algorithm = match self.quality {
            Quality::Fast => texpresso::Algorithm::RangeFit,
            Quality::Balanced => texpresso::Algorithm::ClusterFit,
            Quality::High => texpresso::Algorithm::IterativeClusterFit,
        };
        texpresso::Params {
            algorithm,
            weights: texpresso::COLOUR_WEIGHTS_PERCEPTUAL,
            weigh_colour_by_alpha: true,
        }
    }

    fn texpresso_format(format: PixelFormat) -> texpresso::Format {
        match format {
            PixelFormat::Dxt1 => texpresso::Format::Bc1,
            PixelFormat::Dxt3 => texpresso::Format::Bc2,
            // ARGB never reaches a block codec.
            PixelFormat::Dxt5 | PixelFormat::Argb => texpresso::Format::Bc3,
        }
    }
}

impl BlockCodec for SquishCodec {
    fn compress(&self, format: PixelFormat, rgba: &[u8], width: usize, height: usize, output: &mut [u8]) {
        Self::texpresso_format(format).compress(rgba, width, height, self.params(), output);
    }

    fn decompress(&self, format: PixelFormat, blocks: &[u8], width: usize, height: usize, output: &mut [u8]) {
        Self::texpresso_format(format).decompress(blocks, width, height, output);
    }
}

impl<C: BlockCodec + ?Sized> BlockCodec for &C {
    fn compress(&self, format: PixelFormat, rgba: &[u8], width: usize, height: usize, output: &mut [u8]) {
        (**self).compress(format, rgba, width, height, output)
    }

    fn decompress(&self, format: PixelFormat, blocks: &[u8], width: usize, height: usize, output: &mut [u8]) {
        (**self).decompress(format, blocks, width, height, output)
    }
}

impl<C: BlockCodec + ?Sized> BlockCodec for Box<C> {
    fn compress(&self, format: PixelFormat, rgba: &[u8], width: usize, height: usize, output: &mut [u8]) {
        (**self).compress(format, rgba, width, height, output)
    }

    fn decompress(&self, format: PixelFormat, blocks: &[u8], width: usize, height: usize, output: &mut [u8]) {
        (**self).decompress(format, blocks, width, height, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_block_survives_compression() {
        let codec = SquishCodec::default();
        let rgba: Vec<u8> = [255u8, 0, 0, 255].repeat(16);

        for format in [PixelFormat::Dxt1, PixelFormat::Dxt3, PixelFormat::Dxt5] {
            let mut blocks = vec![0u8; format.storage_requirement(4, 4)];
            codec.compress(format, &rgba, 4, 4, &mut blocks);

            let mut decoded = vec![0u8; 64];
            codec.decompress(format, &blocks, 4, 4, &mut decoded);

            for pixel in decoded.chunks_exact(4) {
                // Pure red is exactly representable in RGB565.
                assert_eq!(pixel, [255, 0, 0, 255], "format {}", format);
            }
        }
    }

    #[test]
    fn test_quality_default_is_balanced() {
        assert_eq!(SquishCodec::default().quality(), Quality::Balanced);
        assert_eq!(SquishCodec::new(Quality::High).quality(), Quality::High);
    }
}
