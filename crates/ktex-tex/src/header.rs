//! TEX header structures.

use std::fmt;

use ktex_codec::PixelFormat;
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, Result};

/// On-disk TEX header, five little-endian u32 values.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawTexHeader {
    /// Target platform.
    pub platform: U32,
    /// Pixel format of every level.
    pub pixel_format: U32,
    /// Texture type.
    pub texture_type: U32,
    /// Number of directory entries that follow.
    pub mip_count: U32,
    /// Header flags.
    pub flags: U32,
}

impl RawTexHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 20;
}

/// Size of one mipmap directory entry: width, height, pitch (u16) and payload length (u32).
pub const DIRECTORY_ENTRY_SIZE: usize = 10;

/// Platform a texture was authored for. Metadata only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Platform {
    #[default]
    Unknown,
    Ps3,
    Xbox360,
    Pc,
    /// Any other stored value, kept verbatim.
    Other(u32),
}

impl Platform {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::Unknown,
            10 => Self::Ps3,
            11 => Self::Xbox360,
            12 => Self::Pc,
            other => Self::Other(other),
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Ps3 => 10,
            Self::Xbox360 => 11,
            Self::Pc => 12,
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Ps3 => f.write_str("PS3"),
            Self::Xbox360 => f.write_str("Xbox360"),
            Self::Pc => f.write_str("PC"),
            Self::Other(value) => write!(f, "Unknown ({})", value),
        }
    }
}

/// Texture dimensionality. Metadata only; does not change payload geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum TextureType {
    OneD = 1,
    #[default]
    TwoD = 2,
    ThreeD = 3,
    Cubemap = 4,
}

impl TextureType {
    pub const ALL: [TextureType; 4] = [Self::OneD, Self::TwoD, Self::ThreeD, Self::Cubemap];

    pub fn from_raw(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::OneD),
            2 => Ok(Self::TwoD),
            3 => Ok(Self::ThreeD),
            4 => Ok(Self::Cubemap),
            other => Err(Error::MalformedHeader(format!("unknown texture type {}", other))),
        }
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::OneD => "1D",
            Self::TwoD => "2D",
            Self::ThreeD => "3D",
            Self::Cubemap => "Cubemap",
        }
    }
}

impl fmt::Display for TextureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TextureType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown texture type '{}' (expected 1D, 2D, 3D or Cubemap)", s))
    }
}

/// Decoded TEX header. The mip count is owned by the container's level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TexHeader {
    pub platform: Platform,
    pub pixel_format: PixelFormat,
    pub texture_type: TextureType,
    pub flags: u32,
}

impl TexHeader {
    /// Header as written by the converter: unknown platform, no flags.
    pub fn new(pixel_format: PixelFormat, texture_type: TextureType) -> Self {
        Self {
            platform: Platform::Unknown,
            pixel_format,
            texture_type,
            flags: 0,
        }
    }

    pub(crate) fn from_raw(raw: &RawTexHeader) -> Result<Self> {
        Ok(Self {
            platform: Platform::from_raw(raw.platform.get()),
            pixel_format: PixelFormat::from_raw(raw.pixel_format.get())?,
            texture_type: TextureType::from_raw(raw.texture_type.get())?,
            flags: raw.flags.get(),
        })
    }

    pub(crate) fn to_raw(self, mip_count: u32) -> RawTexHeader {
        RawTexHeader {
            platform: U32::new(self.platform.to_raw()),
            pixel_format: U32::new(self.pixel_format.to_raw()),
            texture_type: U32::new(self.texture_type.to_raw()),
            mip_count: U32::new(mip_count),
            flags: U32::new(self.flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_header_layout() {
        assert_eq!(std::mem::size_of::<RawTexHeader>(), RawTexHeader::SIZE);

        let header = TexHeader::new(PixelFormat::Dxt5, TextureType::TwoD).to_raw(3);
        assert_eq!(
            header.as_bytes(),
            &[0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_platform_preserves_unknown_values() {
        assert_eq!(Platform::from_raw(12), Platform::Pc);
        assert_eq!(Platform::from_raw(77), Platform::Other(77));
        assert_eq!(Platform::Other(77).to_raw(), 77);
        assert_eq!(Platform::Xbox360.to_string(), "Xbox360");
    }

    #[test]
    fn test_texture_type() {
        assert_eq!(TextureType::from_raw(4).unwrap(), TextureType::Cubemap);
        assert!(matches!(TextureType::from_raw(0), Err(Error::MalformedHeader(_))));
        assert_eq!("cubemap".parse::<TextureType>().unwrap(), TextureType::Cubemap);
        assert_eq!("2d".parse::<TextureType>().unwrap(), TextureType::TwoD);
    }

    #[test]
    fn test_unsupported_pixel_format_in_header() {
        let mut raw = TexHeader::new(PixelFormat::Argb, TextureType::TwoD).to_raw(1);
        raw.pixel_format = U32::new(9);
        assert!(matches!(
            TexHeader::from_raw(&raw),
            Err(Error::Codec(ktex_codec::Error::UnsupportedFormat(9)))
        ));
    }
}
