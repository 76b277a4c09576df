//! Loading TEX files for display.

use std::fs;
use std::io;
use std::path::Path;

use image::{imageops, RgbaImage};
use ktex_atlas::{AtlasParse, AtlasWarning};
use ktex_codec::{CodecRegistry, PixelFormat};
use ktex_tex::{MipmapLevel, Platform, TexContainer, TexHeader, TextureType};
use tracing::debug;

use crate::{Error, Result};

/// Extension of the atlas sidecar next to a `.tex` file.
pub const SIDECAR_EXTENSION: &str = "xml";

/// Header summary of a container, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TexInfo {
    pub platform: Platform,
    pub pixel_format: PixelFormat,
    pub texture_type: TextureType,
    pub width: u16,
    pub height: u16,
    pub mip_count: usize,
}

impl TexInfo {
    pub fn from_container(container: &TexContainer) -> Self {
        let header = container.header();
        let main = container.main_mipmap();
        Self {
            platform: header.platform,
            pixel_format: header.pixel_format,
            texture_type: header.texture_type,
            width: main.width,
            height: main.height,
            mip_count: container.mip_count(),
        }
    }
}

impl std::fmt::Display for TexInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} {} {}, {} mipmap(s), platform {}",
            self.width, self.height, self.pixel_format, self.texture_type, self.mip_count, self.platform
        )
    }
}

/// A decoded texture ready for display or export.
#[derive(Debug, Clone)]
pub struct LoadedTexture {
    pub container: TexContainer,
    pub info: TexInfo,
    /// Level 0, top-left origin.
    pub image: RgbaImage,
    /// Present when a sidecar was found.
    pub atlas: Option<AtlasParse>,
}

impl LoadedTexture {
    pub fn header(&self) -> &TexHeader {
        self.container.header()
    }

    pub fn levels(&self) -> &[MipmapLevel] {
        self.container.levels()
    }
}

/// Decode level 0 of a container into an upright raster.
pub fn decode_main_image(container: &TexContainer, registry: &CodecRegistry) -> Result<RgbaImage> {
    let main = container.main_mipmap();
    let width = main.width as u32;
    let height = main.height as u32;

    let rgba = container.decode_level(registry, 0)?;
    let mut image = RgbaImage::from_raw(width, height, rgba).ok_or(Error::InvalidRaster { width, height })?;
    imageops::flip_vertical_in_place(&mut image);
    Ok(image)
}

/// Parse and decode a container held in memory.
///
/// `sidecar` is the atlas document, if any; its coordinates are mapped onto
/// the level 0 dimensions.
pub fn load_bytes(data: &[u8], sidecar: Option<&[u8]>) -> Result<LoadedTexture> {
    let container = TexContainer::parse(data)?;
    let registry = CodecRegistry::default();
    let image = decode_main_image(&container, &registry)?;
    let info = TexInfo::from_container(&container);

    let atlas = sidecar.map(|xml| ktex_atlas::parse_bytes(xml, image.width(), image.height()));

    debug!(%info, elements = atlas.as_ref().map_or(0, |a| a.elements.len()), "loaded texture");

    Ok(LoadedTexture {
        container,
        info,
        image,
        atlas,
    })
}

/// Load a `.tex` file and the atlas sidecar next to it (same path, `.xml`
/// extension) if one exists.
///
/// A sidecar that exists but cannot be read yields an empty atlas with an
/// [`AtlasWarning::Unreadable`] warning.
pub fn load_container(path: impl AsRef<Path>) -> Result<LoadedTexture> {
    let path = path.as_ref();
    let data = fs::read(path)?;

    let sidecar_path = path.with_extension(SIDECAR_EXTENSION);
    match fs::read(&sidecar_path) {
        Ok(xml) => load_bytes(&data, Some(xml.as_slice())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => load_bytes(&data, None),
        Err(e) => {
            let mut loaded = load_bytes(&data, None)?;
            loaded.atlas = Some(AtlasParse::with_warning(AtlasWarning::Unreadable(format!(
                "{}: {}",
                sidecar_path.display(),
                e
            ))));
            Ok(loaded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConversionOptions, Converter};
    use image::Rgba;
    use ktex_codec::Quality;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 7, 255]))
    }

    fn argb() -> Converter {
        Converter::new(
            ConversionOptions::default()
                .pixel_format(PixelFormat::Argb)
                .quality(Quality::Fast),
        )
    }

    #[test]
    fn test_convert_then_load_is_lossless_for_argb() {
        let source = gradient(5, 3);
        let bytes = argb().convert_image(&source).unwrap().to_bytes().unwrap();

        let loaded = load_bytes(&bytes, None).unwrap();
        assert_eq!(loaded.image, source);
        assert!(loaded.atlas.is_none());
        assert_eq!(
            loaded.info,
            TexInfo {
                platform: Platform::Unknown,
                pixel_format: PixelFormat::Argb,
                texture_type: TextureType::TwoD,
                width: 5,
                height: 3,
                mip_count: 1,
            }
        );
    }

    #[test]
    fn test_load_dxt_keeps_dimensions() {
        let converter = Converter::new(ConversionOptions::default().quality(Quality::Fast).generate_mipmaps(true));
        let bytes = converter.convert_image(&gradient(6, 6)).unwrap().to_bytes().unwrap();

        let loaded = load_bytes(&bytes, None).unwrap();
        assert_eq!(loaded.image.dimensions(), (6, 6));
        assert_eq!(loaded.info.mip_count, 3);
        assert_eq!(loaded.info.pixel_format, PixelFormat::Dxt5);
    }

    #[test]
    fn test_load_picks_up_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("hud.tex");
        let bytes = argb().convert_image(&gradient(8, 8)).unwrap().to_bytes().unwrap();
        fs::write(&tex, bytes).unwrap();
        fs::write(
            dir.path().join("hud.xml"),
            r#"<Atlas><Elements><Element name="a" u1="0" u2="0.5" v1="0.5" v2="1"/></Elements></Atlas>"#,
        )
        .unwrap();

        let loaded = load_container(&tex).unwrap();
        let atlas = loaded.atlas.unwrap();
        assert_eq!(atlas.elements.len(), 1);
        assert_eq!(atlas.elements[0].width(), 4);
    }

    #[test]
    fn test_load_without_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("plain.tex");
        fs::write(&tex, argb().convert_image(&gradient(2, 2)).unwrap().to_bytes().unwrap()).unwrap();

        assert!(load_container(&tex).unwrap().atlas.is_none());
    }

    #[test]
    fn test_malformed_sidecar_does_not_fail_load() {
        let bytes = argb().convert_image(&gradient(4, 4)).unwrap().to_bytes().unwrap();
        let loaded = load_bytes(&bytes, Some(&b"<Atlas><Elements>"[..])).unwrap();

        let atlas = loaded.atlas.unwrap();
        assert!(atlas.is_empty());
        assert!(atlas.has_warnings());
    }

    #[test]
    fn test_truncated_file_fails() {
        let bytes = argb().convert_image(&gradient(4, 4)).unwrap().to_bytes().unwrap();
        assert!(matches!(
            load_bytes(&bytes[..bytes.len() - 1], None),
            Err(Error::Tex(ktex_tex::Error::TruncatedContainer { .. }))
        ));
    }
}
