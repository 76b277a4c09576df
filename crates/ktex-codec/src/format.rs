//! Pixel formats and their storage geometry.

use std::fmt;

use crate::{Error, Result};

/// Pixel format of every mipmap payload in a TEX container.
///
/// The discriminants are the values stored in the container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum PixelFormat {
    /// BC1, 8 bytes per 4x4 block.
    Dxt1 = 0,
    /// BC2, 16 bytes per 4x4 block.
    Dxt3 = 1,
    /// BC3, 16 bytes per 4x4 block.
    Dxt5 = 2,
    /// Uncompressed interleaved R, G, B, A bytes.
    Argb = 4,
}

/// Static description of a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Display name.
    pub name: &'static str,
    /// Bytes per 4x4 block for compressed formats, bytes per pixel otherwise.
    pub block_size: usize,
    /// Whether payloads are 4x4 block compressed.
    pub compressed: bool,
}

/// Lookup table indexed by [`PixelFormat::index`].
static FORMAT_TABLE: [FormatInfo; 4] = [
    FormatInfo {
        name: "DXT1",
        block_size: 8,
        compressed: true,
    },
    FormatInfo {
        name: "DXT3",
        block_size: 16,
        compressed: true,
    },
    FormatInfo {
        name: "DXT5",
        block_size: 16,
        compressed: true,
    },
    FormatInfo {
        name: "ARGB",
        block_size: 4,
        compressed: false,
    },
];

impl PixelFormat {
    /// All supported formats, in table order.
    pub const ALL: [PixelFormat; 4] = [Self::Dxt1, Self::Dxt3, Self::Dxt5, Self::Argb];

    /// Look up a format from its header value.
    pub fn from_raw(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Dxt1),
            1 => Ok(Self::Dxt3),
            2 => Ok(Self::Dxt5),
            4 => Ok(Self::Argb),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }

    /// Value stored in the container header.
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Dxt1 => 0,
            Self::Dxt3 => 1,
            Self::Dxt5 => 2,
            Self::Argb => 3,
        }
    }

    /// Static description of this format.
    #[inline]
    pub fn info(self) -> &'static FormatInfo {
        &FORMAT_TABLE[self.index()]
    }

    /// Bytes per 4x4 block (compressed) or per pixel (ARGB).
    #[inline]
    pub fn block_size(self) -> usize {
        self.info().block_size
    }

    #[inline]
    pub fn is_compressed(self) -> bool {
        self.info().compressed
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Bytes needed to store a `width` x `height` image in this format.
    ///
    /// Compressed formats round both dimensions up to whole 4x4 blocks.
    pub fn storage_requirement(self, width: usize, height: usize) -> usize {
        if self.is_compressed() {
            let blocks_wide = width.div_ceil(4);
            let blocks_high = height.div_ceil(4);
            blocks_wide * blocks_high * self.block_size()
        } else {
            width * height * self.block_size()
        }
    }

    /// Directory pitch for a level of the given width.
    ///
    /// For compressed formats this is the size of one row of blocks, computed
    /// as `storage_requirement(width, 1)`.
    pub fn pitch(self, width: usize) -> usize {
        if self.is_compressed() {
            self.storage_requirement(width, 1)
        } else {
            width * 4
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::from_raw(value)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown pixel format '{}' (expected DXT1, DXT3, DXT5 or ARGB)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(PixelFormat::Dxt1.block_size(), 8);
        assert_eq!(PixelFormat::Dxt3.block_size(), 16);
        assert_eq!(PixelFormat::Dxt5.block_size(), 16);
        assert_eq!(PixelFormat::Argb.block_size(), 4);
    }

    #[test]
    fn test_storage_requirement() {
        // A single pixel still occupies a whole block.
        assert_eq!(PixelFormat::Dxt1.storage_requirement(1, 1), 8);
        assert_eq!(PixelFormat::Dxt5.storage_requirement(1, 1), 16);
        assert_eq!(PixelFormat::Dxt5.storage_requirement(4, 4), 16);
        assert_eq!(PixelFormat::Dxt5.storage_requirement(5, 4), 32);
        assert_eq!(PixelFormat::Dxt1.storage_requirement(256, 128), 64 * 32 * 8);
        assert_eq!(PixelFormat::Argb.storage_requirement(3, 5), 60);
    }

    #[test]
    fn test_pitch_is_one_block_row() {
        assert_eq!(PixelFormat::Dxt1.pitch(256), 64 * 8);
        assert_eq!(PixelFormat::Dxt5.pitch(256), 64 * 16);
        assert_eq!(PixelFormat::Dxt5.pitch(3), 16);
        assert_eq!(PixelFormat::Argb.pitch(256), 1024);
    }

    #[test]
    fn test_raw_values() {
        for format in PixelFormat::ALL {
            assert_eq!(PixelFormat::from_raw(format.to_raw()).unwrap(), format);
        }
        assert_eq!(PixelFormat::Argb.to_raw(), 4);
        assert!(matches!(PixelFormat::from_raw(3), Err(Error::UnsupportedFormat(3))));
        assert!(matches!(PixelFormat::try_from(99u32), Err(Error::UnsupportedFormat(99))));
    }

    #[test]
    fn test_parse_name() {
        assert_eq!("dxt5".parse::<PixelFormat>().unwrap(), PixelFormat::Dxt5);
        assert_eq!("ARGB".parse::<PixelFormat>().unwrap(), PixelFormat::Argb);
        assert!("BC7".parse::<PixelFormat>().is_err());
    }

    proptest! {
        #[test]
        fn test_dxt1_is_half_of_dxt3_and_dxt5(w in 1usize..4096, h in 1usize..4096) {
            let dxt1 = PixelFormat::Dxt1.storage_requirement(w, h);
            prop_assert_eq!(dxt1, PixelFormat::Dxt3.storage_requirement(w, h) / 2);
            prop_assert_eq!(dxt1, PixelFormat::Dxt5.storage_requirement(w, h) / 2);
        }
    }
}
