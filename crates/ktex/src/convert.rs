//! Raster to TEX conversion.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use ktex_codec::CodecRegistry;
use ktex_tex::{MipmapBuilder, TexContainer, TexHeader};
use tracing::{debug, warn};

use crate::{ConversionOptions, Error, Result};

/// Extension given to converted files.
pub const TEX_EXTENSION: &str = "tex";

/// Result of converting one file in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<()>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Converts rasters into TEX containers with fixed options.
#[derive(Debug)]
pub struct Converter {
    options: ConversionOptions,
    registry: CodecRegistry,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            registry: CodecRegistry::with_quality(options.quality),
            options,
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Build a container from a top-left origin raster.
    ///
    /// The raster is flipped vertically before encoding since TEX stores rows
    /// bottom first. Platform and flags are written as 0.
    pub fn convert_image(&self, image: &RgbaImage) -> Result<TexContainer> {
        let flipped = imageops::flip_vertical(image);

        let levels = MipmapBuilder::new(&self.registry, self.options.pixel_format)
            .premultiply_alpha(self.options.premultiply_alpha)
            .build_chain(&flipped, self.options.generate_mipmaps)?;

        let header = TexHeader::new(self.options.pixel_format, self.options.texture_type);
        let container = TexContainer::new(header, levels)?;

        debug!(
            width = image.width(),
            height = image.height(),
            format = %self.options.pixel_format,
            mip_count = container.mip_count(),
            "converted raster"
        );

        Ok(container)
    }

    /// Convert a raster and write the container to `writer`.
    pub fn convert_to_writer<W: Write>(&self, image: &RgbaImage, writer: &mut W) -> Result<()> {
        let container = self.convert_image(image)?;
        container.write_to(writer)?;
        Ok(())
    }

    /// Convert the image file at `input` and write the container to `output`.
    ///
    /// Nothing is written if conversion fails.
    pub fn convert_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let input = input.as_ref();
        let output = output.as_ref();

        let image = image::open(input)?.to_rgba8();
        let container = self.convert_image(&image)?;

        let mut writer = BufWriter::new(File::create(output)?);
        container.write_to(&mut writer)?;
        writer.flush()?;

        debug!(input = %input.display(), output = %output.display(), "wrote TEX container");
        Ok(())
    }

    /// Convert every input to `<output_dir>/<stem>.tex`.
    ///
    /// Each input is converted independently; a failure is recorded in its
    /// outcome and the rest carry on. Outcomes are in input order.
    pub fn convert_batch(&self, inputs: &[PathBuf], output_dir: impl AsRef<Path>) -> Result<Vec<BatchOutcome>> {
        self.convert_batch_with(inputs, output_dir, |_| {})
    }

    /// [`convert_batch`](Self::convert_batch), calling `on_done` as each input
    /// finishes.
    ///
    /// With the `parallel` feature `on_done` runs on worker threads in
    /// completion order.
    pub fn convert_batch_with<F>(
        &self,
        inputs: &[PathBuf],
        output_dir: impl AsRef<Path>,
        on_done: F,
    ) -> Result<Vec<BatchOutcome>>
    where
        F: Fn(&BatchOutcome) + Sync,
    {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        Ok(self.run_batch(inputs, output_dir, &on_done))
    }

    fn convert_one(&self, input: &Path, output_dir: &Path) -> BatchOutcome {
        let (output, result) = match output_path(input, output_dir) {
            Ok(output) => {
                let result = self.convert_file(input, &output);
                (output, result)
            }
            Err(e) => (output_dir.to_path_buf(), Err(e)),
        };

        if let Err(e) = &result {
            warn!(input = %input.display(), error = %e, "conversion failed");
        }

        BatchOutcome {
            input: input.to_path_buf(),
            output,
            result,
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_batch<F>(&self, inputs: &[PathBuf], output_dir: &Path, on_done: &F) -> Vec<BatchOutcome>
    where
        F: Fn(&BatchOutcome) + Sync,
    {
        inputs
            .iter()
            .map(|input| {
                let outcome = self.convert_one(input, output_dir);
                on_done(&outcome);
                outcome
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_batch<F>(&self, inputs: &[PathBuf], output_dir: &Path, on_done: &F) -> Vec<BatchOutcome>
    where
        F: Fn(&BatchOutcome) + Sync,
    {
        use rayon::prelude::*;

        inputs
            .par_iter()
            .map(|input| {
                let outcome = self.convert_one(input, output_dir);
                on_done(&outcome);
                outcome
            })
            .collect()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

/// `<output_dir>/<file stem of input>.tex`
pub fn output_path(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidInput(input.to_path_buf()))?;

    let mut name = stem.to_os_string();
    name.push(".");
    name.push(TEX_EXTENSION);
    Ok(output_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use ktex_codec::{PixelFormat, Quality};
    use ktex_tex::{Platform, TextureType};

    fn fast(options: ConversionOptions) -> Converter {
        Converter::new(options.quality(Quality::Fast))
    }

    fn two_rows() -> RgbaImage {
        // Top row red, bottom row blue.
        RgbaImage::from_fn(4, 2, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_convert_stores_rows_bottom_first() {
        let converter = fast(ConversionOptions::default().pixel_format(PixelFormat::Argb));
        let container = converter.convert_image(&two_rows()).unwrap();

        let payload = &container.main_mipmap().payload;
        assert_eq!(&payload[0..4], &[0, 0, 255, 255]);
        assert_eq!(&payload[16..20], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_header_fields() {
        let converter = fast(
            ConversionOptions::default()
                .pixel_format(PixelFormat::Dxt1)
                .texture_type(TextureType::Cubemap),
        );
        let container = converter.convert_image(&RgbaImage::new(8, 8)).unwrap();

        let header = container.header();
        assert_eq!(header.platform, Platform::Unknown);
        assert_eq!(header.flags, 0);
        assert_eq!(header.pixel_format, PixelFormat::Dxt1);
        assert_eq!(header.texture_type, TextureType::Cubemap);
        assert_eq!(container.mip_count(), 1);
    }

    #[test]
    fn test_mipmaps_option() {
        let converter = fast(ConversionOptions::default().generate_mipmaps(true));
        let container = converter.convert_image(&RgbaImage::new(8, 2)).unwrap();
        assert_eq!(container.mip_count(), 4);
    }

    #[test]
    fn test_zero_sized_raster_fails() {
        let converter = fast(ConversionOptions::default());
        assert!(matches!(
            converter.convert_image(&RgbaImage::new(0, 4)),
            Err(Error::Tex(ktex_tex::Error::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn test_convert_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sprite.png");
        let output = dir.path().join("sprite.tex");
        two_rows().save(&input).unwrap();

        let converter = fast(ConversionOptions::default().pixel_format(PixelFormat::Argb));
        converter.convert_file(&input, &output).unwrap();

        let container = TexContainer::parse(&fs::read(&output).unwrap()).unwrap();
        assert_eq!(container.main_mipmap().width, 4);
        assert_eq!(container.main_mipmap().height, 2);
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        RgbaImage::new(4, 4).save(&good).unwrap();
        fs::write(&bad, b"not a png").unwrap();

        let out = dir.path().join("out");
        let converter = fast(ConversionOptions::default());
        let outcomes = converter
            .convert_batch(&[bad.clone(), good.clone()], &out)
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].input, bad);
        assert!(!outcomes[0].is_ok());
        assert!(!out.join("bad.tex").exists());

        assert_eq!(outcomes[1].input, good);
        assert!(outcomes[1].is_ok());
        assert_eq!(outcomes[1].output, out.join("good.tex"));
        assert!(out.join("good.tex").exists());
    }

    #[test]
    fn test_batch_reports_every_item() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("tile{}.png", i));
                RgbaImage::new(4, 4).save(&path).unwrap();
                path
            })
            .collect();

        let done = AtomicUsize::new(0);
        let outcomes = fast(ConversionOptions::default())
            .convert_batch_with(&inputs, dir.path().join("out"), |outcome| {
                assert!(outcome.is_ok());
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(done.load(Ordering::SeqCst), 4);
        let order: Vec<_> = outcomes.iter().map(|o| o.input.clone()).collect();
        assert_eq!(order, inputs);
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("art/ui/button.png"), Path::new("build")).unwrap();
        assert_eq!(path, Path::new("build").join("button.tex"));
        let path = output_path(Path::new("hud.v2.png"), Path::new("build")).unwrap();
        assert_eq!(path, Path::new("build").join("hud.v2.tex"));
        assert!(output_path(Path::new(""), Path::new("build")).is_err());
    }
}
