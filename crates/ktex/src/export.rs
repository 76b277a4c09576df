//! PNG export of decoded rasters and atlas regions.

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, ImageFormat, RgbaImage};
use ktex_atlas::{AtlasElement, PixelRect};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Outcome of exporting one atlas element.
#[derive(Debug)]
pub struct ElementExport {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<()>,
}

/// Write a raster as PNG, whatever the extension of `path`.
pub fn export_raster(raster: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    raster.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), width = raster.width(), height = raster.height(), "exported image");
    Ok(())
}

/// Copy out the part of `raster` under `rect`.
///
/// The rectangle is clipped to the raster first. `name` only labels the
/// error when nothing is left after clipping.
pub fn crop_region(raster: &RgbaImage, rect: &PixelRect, name: &str) -> Result<RgbaImage> {
    let (x, y, width, height) = rect
        .clamp_to(raster.width(), raster.height())
        .ok_or_else(|| Error::EmptyRegion { name: name.to_string() })?;

    Ok(imageops::crop_imm(raster, x, y, width, height).to_image())
}

/// Write the part of `raster` under `rect` as PNG.
pub fn export_region(raster: &RgbaImage, rect: &PixelRect, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let region = crop_region(raster, rect, &name)?;
    export_raster(&region, path)
}

/// Write every element to `<dir>/<name>.png`.
///
/// Elements are exported independently; one failure does not stop the rest.
pub fn export_atlas(raster: &RgbaImage, elements: &[AtlasElement], dir: impl AsRef<Path>) -> Result<Vec<ElementExport>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let outcomes = elements
        .iter()
        .map(|element| {
            let path = dir.join(format!("{}.png", sanitize_file_name(&element.name)));

            let result = crop_region(raster, &element.rect, &element.name)
                .and_then(|region| export_raster(&region, &path));
            if let Err(e) = &result {
                warn!(element = %element.name, error = %e, "element export failed");
            }

            ElementExport {
                name: element.name.clone(),
                path,
                result,
            }
        })
        .collect();

    Ok(outcomes)
}

/// Replace characters that are not safe in file names with `_`.
///
/// A trailing `.tex` is dropped so `button.tex` exports as `button.png`.
pub fn sanitize_file_name(name: &str) -> String {
    let stem = name.strip_suffix(".tex").unwrap_or(name);
    let cleaned: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn quadrants() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| match (x < 2, y < 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 255, 255]),
        })
    }

    #[test]
    fn test_export_raster_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        // Extension is ignored, the content is always PNG.
        let path = dir.path().join("out.bin");
        export_raster(&quadrants(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_export_region_crops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("green.png");
        export_region(&quadrants(), &PixelRect::new(2, 0, 2, 2), &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert!(image.pixels().all(|p| *p == Rgba([0, 255, 0, 255])));
    }

    #[test]
    fn test_region_is_clipped() {
        let region = crop_region(&quadrants(), &PixelRect::new(-1, 3, 3, 5), "edge").unwrap();
        assert_eq!(region.dimensions(), (2, 1));
    }

    #[test]
    fn test_region_outside_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.png");
        let result = export_region(&quadrants(), &PixelRect::new(0, 2, 4, -2), &path);

        assert!(matches!(result, Err(Error::EmptyRegion { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_atlas_reports_each_element() {
        let dir = tempfile::tempdir().unwrap();
        let elements = vec![
            AtlasElement::new("ui/red.tex", PixelRect::new(0, 0, 2, 2)),
            AtlasElement::new("gone", PixelRect::new(10, 10, 2, 2)),
            AtlasElement::new("white", PixelRect::new(2, 2, 2, 2)),
        ];

        let outcomes = export_atlas(&quadrants(), &elements, dir.path()).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[0].path, dir.path().join("ui_red.png"));
        assert!(matches!(outcomes[1].result, Err(Error::EmptyRegion { .. })));
        assert!(outcomes[2].result.is_ok());
        assert!(dir.path().join("white.png").exists());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("button.tex"), "button");
        assert_eq!(sanitize_file_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_file_name(".."), "_");
        assert_eq!(sanitize_file_name(""), "_");
    }
}
