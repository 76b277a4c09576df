//! Format-dispatching encode/decode.

use tracing::trace;

use crate::{BlockCodec, Error, PixelFormat, Quality, Result, SquishCodec};

/// Bytes in one raw 4x4 RGBA block.
pub const BLOCK_RGBA_BYTES: usize = 64;

/// Dispatches encode/decode requests to the right backend for a pixel format.
///
/// ARGB is handled inline as an identity transform; the DXT formats go through
/// the injected [`BlockCodec`]. The registry holds no mutable state and can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct CodecRegistry<C = SquishCodec> {
    codec: C,
}

impl CodecRegistry<SquishCodec> {
    /// Registry backed by texpresso at the given quality preset.
    pub fn with_quality(quality: Quality) -> Self {
        Self::new(SquishCodec::new(quality))
    }
}

impl Default for CodecRegistry<SquishCodec> {
    fn default() -> Self {
        Self::with_quality(Quality::default())
    }
}

impl<C: BlockCodec> CodecRegistry<C> {
    /// Create a registry around a block codec.
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Encode a raw RGBA image (row-major, 4 bytes per pixel).
    ///
    /// Returns exactly `format.storage_requirement(width, height)` bytes.
    pub fn encode(&self, rgba: &[u8], width: usize, height: usize, format: PixelFormat) -> Result<Vec<u8>> {
        check_rgba_len(rgba, width, height)?;

        if !format.is_compressed() {
            return Ok(rgba.to_vec());
        }

        let mut output = vec![0u8; format.storage_requirement(width, height)];
        self.codec.compress(format, rgba, width, height, &mut output);
        trace!(%format, width, height, bytes = output.len(), "encoded image");
        Ok(output)
    }

    /// Encode with a per-pixel validity mask.
    ///
    /// The mask is accepted for API compatibility and ignored: every pixel of
    /// every block is treated as valid.
    pub fn encode_masked(
        &self,
        rgba: &[u8],
        width: usize,
        height: usize,
        _mask: u32,
        format: PixelFormat,
    ) -> Result<Vec<u8>> {
        self.encode(rgba, width, height, format)
    }

    /// Decode a payload back to raw RGBA for the declared dimensions.
    ///
    /// `payload` must be exactly the storage requirement; the result is
    /// `width * height * 4` bytes.
    pub fn decode(&self, payload: &[u8], width: usize, height: usize, format: PixelFormat) -> Result<Vec<u8>> {
        let expected = format.storage_requirement(width, height);
        if payload.len() != expected {
            return Err(Error::PayloadSizeMismatch {
                expected,
                actual: payload.len(),
            });
        }

        if !format.is_compressed() {
            return Ok(payload.to_vec());
        }

        let mut output = vec![0u8; width * height * 4];
        self.codec.decompress(format, payload, width, height, &mut output);
        trace!(%format, width, height, "decoded image");
        Ok(output)
    }

    /// [`encode`](Self::encode) with a raw header format value.
    pub fn encode_raw_format(&self, rgba: &[u8], width: usize, height: usize, format: u32) -> Result<Vec<u8>> {
        self.encode(rgba, width, height, PixelFormat::from_raw(format)?)
    }

    /// [`decode`](Self::decode) with a raw header format value.
    pub fn decode_raw_format(&self, payload: &[u8], width: usize, height: usize, format: u32) -> Result<Vec<u8>> {
        self.decode(payload, width, height, PixelFormat::from_raw(format)?)
    }

    /// Compress a single 4x4 block of RGBA pixels.
    pub fn compress_block(&self, rgba: &[u8; BLOCK_RGBA_BYTES], format: PixelFormat) -> Result<Vec<u8>> {
        self.encode(rgba, 4, 4, format)
    }

    /// Compress a single 4x4 block with a pixel mask (bit `n` = pixel `n`).
    ///
    /// The mask is ignored, see [`encode_masked`](Self::encode_masked).
    pub fn compress_block_masked(
        &self,
        rgba: &[u8; BLOCK_RGBA_BYTES],
        mask: u32,
        format: PixelFormat,
    ) -> Result<Vec<u8>> {
        self.encode_masked(rgba, 4, 4, mask, format)
    }

    /// Decompress a single encoded 4x4 block.
    pub fn decompress_block(&self, block: &[u8], format: PixelFormat) -> Result<[u8; BLOCK_RGBA_BYTES]> {
        let decoded = self.decode(block, 4, 4, format)?;
        let mut out = [0u8; BLOCK_RGBA_BYTES];
        out.copy_from_slice(&decoded);
        Ok(out)
    }
}

fn check_rgba_len(rgba: &[u8], width: usize, height: usize) -> Result<()> {
    let expected = width * height * 4;
    if rgba.len() != expected {
        return Err(Error::InputSizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records calls and fills output with a marker byte.
    #[derive(Default)]
    struct CountingCodec {
        compress_calls: AtomicUsize,
    }

    impl BlockCodec for CountingCodec {
        fn compress(&self, _: PixelFormat, _: &[u8], _: usize, _: usize, output: &mut [u8]) {
            self.compress_calls.fetch_add(1, Ordering::SeqCst);
            output.fill(0xAB);
        }

        fn decompress(&self, _: PixelFormat, _: &[u8], _: usize, _: usize, output: &mut [u8]) {
            output.fill(0xCD);
        }
    }

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        (0..width * height * 4).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn test_argb_round_trip_is_lossless() {
        let registry = CodecRegistry::with_quality(Quality::Balanced);
        let rgba = gradient(7, 3);

        let encoded = registry.encode(&rgba, 7, 3, PixelFormat::Argb).unwrap();
        assert_eq!(encoded, rgba);

        let decoded = registry.decode(&encoded, 7, 3, PixelFormat::Argb).unwrap();
        assert_eq!(decoded, rgba);
    }

    #[test]
    fn test_compressed_output_sizes() {
        let registry = CodecRegistry::with_quality(Quality::Balanced);
        let rgba = gradient(10, 6);

        for format in [PixelFormat::Dxt1, PixelFormat::Dxt3, PixelFormat::Dxt5] {
            let encoded = registry.encode(&rgba, 10, 6, format).unwrap();
            assert_eq!(encoded.len(), format.storage_requirement(10, 6));

            let decoded = registry.decode(&encoded, 10, 6, format).unwrap();
            assert_eq!(decoded.len(), 10 * 6 * 4);
        }
    }

    #[test]
    fn test_injected_codec_is_used() {
        let registry = CodecRegistry::new(CountingCodec::default());
        let rgba = gradient(4, 4);

        let encoded = registry.encode(&rgba, 4, 4, PixelFormat::Dxt1).unwrap();
        assert_eq!(encoded, vec![0xAB; 8]);
        assert_eq!(registry.codec().compress_calls.load(Ordering::SeqCst), 1);

        // ARGB bypasses the block codec.
        registry.encode(&rgba, 4, 4, PixelFormat::Argb).unwrap();
        assert_eq!(registry.codec().compress_calls.load(Ordering::SeqCst), 1);

        let decoded = registry.decode(&encoded, 4, 4, PixelFormat::Dxt1).unwrap();
        assert_eq!(decoded, vec![0xCD; 64]);
    }

    #[test]
    fn test_mask_is_ignored() {
        let registry = CodecRegistry::with_quality(Quality::Balanced);
        let mut block = [0u8; BLOCK_RGBA_BYTES];
        for (i, byte) in block.iter_mut().enumerate() {
            *byte = (i * 13 % 256) as u8;
        }

        let plain = registry.compress_block(&block, PixelFormat::Dxt5).unwrap();
        let masked = registry.compress_block_masked(&block, 0x0001, PixelFormat::Dxt5).unwrap();
        assert_eq!(plain, masked);

        let decoded = registry.decompress_block(&plain, PixelFormat::Dxt5).unwrap();
        assert_eq!(decoded.len(), BLOCK_RGBA_BYTES);
    }

    #[test]
    fn test_unsupported_format() {
        let registry = CodecRegistry::with_quality(Quality::Balanced);
        let rgba = gradient(4, 4);

        assert!(matches!(
            registry.encode_raw_format(&rgba, 4, 4, 7),
            Err(Error::UnsupportedFormat(7))
        ));
        assert!(matches!(
            registry.decode_raw_format(&[0u8; 16], 4, 4, 3),
            Err(Error::UnsupportedFormat(3))
        ));
        assert_eq!(registry.encode_raw_format(&rgba, 4, 4, 4).unwrap(), rgba);
    }

    #[test]
    fn test_size_checks() {
        let registry = CodecRegistry::with_quality(Quality::Balanced);

        assert!(matches!(
            registry.encode(&[0u8; 10], 2, 2, PixelFormat::Dxt1),
            Err(Error::InputSizeMismatch { expected: 16, actual: 10 })
        ));
        assert!(matches!(
            registry.decode(&[0u8; 8], 4, 4, PixelFormat::Dxt5),
            Err(Error::PayloadSizeMismatch { expected: 16, actual: 8 })
        ));
    }

    proptest! {
        #[test]
        fn test_any_raster_round_trips_through_argb(
            (width, height, rgba) in (1usize..=32, 1usize..=32).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), prop::collection::vec(any::<u8>(), w * h * 4))
            })
        ) {
            let registry = CodecRegistry::with_quality(Quality::Fast);
            let encoded = registry.encode(&rgba, width, height, PixelFormat::Argb).unwrap();
            prop_assert_eq!(encoded.len(), PixelFormat::Argb.storage_requirement(width, height));
            let decoded = registry.decode(&encoded, width, height, PixelFormat::Argb).unwrap();
            prop_assert_eq!(decoded, rgba);
        }
    }
}
