//! TEX container reading and writing.
//!
//! Layout (little-endian):
//!
//! ```text
//! header     platform:u32 pixel_format:u32 texture_type:u32 mip_count:u32 flags:u32
//! directory  mip_count x { width:u16 height:u16 pitch:u16 payload_len:u32 }
//! payloads   concatenated in directory order, no padding
//! ```
//!
//! Images are stored vertically flipped relative to top-left raster order.
//! Flipping is the caller's job; this module only moves bytes.

use std::io::Write;

use ktex_codec::{BlockCodec, CodecRegistry, PixelFormat};
use ktex_common::BinaryReader;
use tracing::{debug, warn};
use zerocopy::IntoBytes;

use crate::header::{RawTexHeader, TexHeader, DIRECTORY_ENTRY_SIZE};
use crate::{Error, Result};

/// One level of a mipmap chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipmapLevel {
    pub width: u16,
    pub height: u16,
    /// Bytes per row for ARGB, bytes per block row for DXT formats.
    pub pitch: u16,
    /// Encoded pixel data, exactly the storage requirement for the level.
    pub payload: Vec<u8>,
}

impl MipmapLevel {
    pub fn new(width: u16, height: u16, pitch: u16, payload: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pitch,
            payload,
        }
    }

    /// Decode this level to raw RGBA.
    pub fn decode<C: BlockCodec>(&self, registry: &CodecRegistry<C>, format: PixelFormat) -> Result<Vec<u8>> {
        Ok(registry.decode(&self.payload, self.width as usize, self.height as usize, format)?)
    }

    fn check_payload(&self, level: usize, format: PixelFormat) -> Result<()> {
        let expected = format.storage_requirement(self.width as usize, self.height as usize);
        if self.payload.len() != expected {
            return Err(Error::LevelSizeMismatch {
                level,
                expected,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }
}

/// A TEX texture: header plus a largest-first mipmap chain.
///
/// Levels are kept as encoded payloads; decode them individually with
/// [`decode_level`](Self::decode_level).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexContainer {
    header: TexHeader,
    levels: Vec<MipmapLevel>,
}

impl TexContainer {
    /// Build a container, checking every payload against the pixel format.
    pub fn new(header: TexHeader, levels: Vec<MipmapLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::EmptyContainer);
        }
        for (index, level) in levels.iter().enumerate() {
            level.check_payload(index, header.pixel_format)?;
        }
        Ok(Self { header, levels })
    }

    pub fn header(&self) -> &TexHeader {
        &self.header
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.header.pixel_format
    }

    pub fn mip_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[MipmapLevel] {
        &self.levels
    }

    /// The largest level.
    pub fn main_mipmap(&self) -> &MipmapLevel {
        // `new` and `parse` both reject empty chains.
        &self.levels[0]
    }

    /// Level `index`, 0 being the largest.
    pub fn mipmap(&self, index: usize) -> Result<&MipmapLevel> {
        self.levels.get(index).ok_or(Error::MipmapOutOfRange {
            index,
            count: self.levels.len(),
        })
    }

    /// Decode level `index` to raw RGBA (still in stored, flipped row order).
    pub fn decode_level<C: BlockCodec>(&self, registry: &CodecRegistry<C>, index: usize) -> Result<Vec<u8>> {
        let level = self.mipmap(index)?;
        debug!(index, width = level.width, height = level.height, "decoding mipmap");
        level.decode(registry, self.header.pixel_format)
    }

    /// Parse a container from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        let raw: RawTexHeader = reader.read_struct()?;
        let mip_count = raw.mip_count.get() as usize;
        if mip_count < 1 {
            return Err(Error::MalformedHeader("mip count is zero".into()));
        }
        let header = TexHeader::from_raw(&raw)?;

        let directory_len = mip_count as u64 * DIRECTORY_ENTRY_SIZE as u64;
        if directory_len > reader.remaining() as u64 {
            return Err(Error::TruncatedContainer {
                needed: directory_len,
                available: reader.remaining() as u64,
            });
        }

        let mut entries = Vec::with_capacity(mip_count);
        for _ in 0..mip_count {
            let width = reader.read_u16()?;
            let height = reader.read_u16()?;
            let pitch = reader.read_u16()?;
            let payload_len = reader.read_u32()?;
            entries.push((width, height, pitch, payload_len as usize));
        }

        let payload_total: u64 = entries.iter().map(|e| e.3 as u64).sum();
        if payload_total > reader.remaining() as u64 {
            return Err(Error::TruncatedContainer {
                needed: payload_total,
                available: reader.remaining() as u64,
            });
        }

        let mut levels = Vec::with_capacity(mip_count);
        for (index, (width, height, pitch, payload_len)) in entries.into_iter().enumerate() {
            let payload = reader.read_bytes(payload_len)?.to_vec();
            let level = MipmapLevel::new(width, height, pitch, payload);
            level.check_payload(index, header.pixel_format)?;
            levels.push(level);
        }

        if !reader.is_empty() {
            warn!(trailing = reader.remaining(), "ignoring trailing bytes after TEX payloads");
        }
        if !is_halving_chain(&levels) {
            debug!("mipmap dimensions do not form a halving chain");
        }

        debug!(
            format = %header.pixel_format,
            texture_type = %header.texture_type,
            mip_count,
            "parsed TEX container"
        );

        Ok(Self { header, levels })
    }

    /// Write the container to a byte stream.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mip_count = u32::try_from(self.levels.len()).map_err(|_| Error::DimensionOverflow {
            field: "mip count",
            value: self.levels.len(),
        })?;
        writer.write_all(self.header.to_raw(mip_count).as_bytes())?;

        for level in &self.levels {
            let payload_len = u32::try_from(level.payload.len()).map_err(|_| Error::DimensionOverflow {
                field: "payload length",
                value: level.payload.len(),
            })?;
            writer.write_all(&level.width.to_le_bytes())?;
            writer.write_all(&level.height.to_le_bytes())?;
            writer.write_all(&level.pitch.to_le_bytes())?;
            writer.write_all(&payload_len.to_le_bytes())?;
        }

        for level in &self.levels {
            writer.write_all(&level.payload)?;
        }

        Ok(())
    }

    /// Serialize the container into a new byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut output)?;
        Ok(output)
    }

    /// Total serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        RawTexHeader::SIZE
            + self.levels.len() * DIRECTORY_ENTRY_SIZE
            + self.levels.iter().map(|l| l.payload.len()).sum::<usize>()
    }
}

/// Check that each level halves the previous one, clamped at 1.
fn is_halving_chain(levels: &[MipmapLevel]) -> bool {
    levels.windows(2).all(|pair| {
        pair[1].width == (pair[0].width >> 1).max(1) && pair[1].height == (pair[0].height >> 1).max(1)
    })
}
