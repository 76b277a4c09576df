//! ktex CLI - convert, inspect and export TEX textures.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use ktex::prelude::*;

/// ktex - TEX texture conversion tool
#[derive(Parser)]
#[command(name = "ktex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert images (PNG and other raster formats) to TEX
    Convert {
        /// Input files, directories or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory
        #[arg(short, long, env = "KTEX_OUTPUT")]
        output: PathBuf,

        /// Pixel format
        #[arg(short, long, value_enum, env = "KTEX_FORMAT", default_value_t = FormatArg::Dxt5)]
        format: FormatArg,

        /// Texture type
        #[arg(short, long, value_enum, env = "KTEX_TEXTURE_TYPE", default_value_t = TextureTypeArg::TwoD)]
        texture_type: TextureTypeArg,

        /// Generate the full mipmap chain
        #[arg(short, long, env = "KTEX_MIPMAPS")]
        mipmaps: bool,

        /// Premultiply colour by alpha before encoding
        #[arg(short, long, env = "KTEX_PREMULTIPLY")]
        premultiply: bool,

        /// DXT compression quality
        #[arg(short, long, value_enum, env = "KTEX_QUALITY", default_value_t = QualityArg::Balanced)]
        quality: QualityArg,
    },

    /// Show header, mipmaps and atlas of a TEX file
    Info {
        /// Input TEX file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the main mipmap of a TEX file as PNG
    Export {
        /// Input TEX file
        file: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export atlas elements of a TEX file as separate PNGs
    ExportAtlas {
        /// Input TEX file
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Only export the element with this name
        #[arg(short, long)]
        element: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Dxt1,
    Dxt3,
    Dxt5,
    Argb,
}

impl From<FormatArg> for PixelFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Dxt1 => PixelFormat::Dxt1,
            FormatArg::Dxt3 => PixelFormat::Dxt3,
            FormatArg::Dxt5 => PixelFormat::Dxt5,
            FormatArg::Argb => PixelFormat::Argb,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TextureTypeArg {
    #[value(name = "1d")]
    OneD,
    #[value(name = "2d")]
    TwoD,
    #[value(name = "3d")]
    ThreeD,
    Cubemap,
}

impl From<TextureTypeArg> for TextureType {
    fn from(arg: TextureTypeArg) -> Self {
        match arg {
            TextureTypeArg::OneD => TextureType::OneD,
            TextureTypeArg::TwoD => TextureType::TwoD,
            TextureTypeArg::ThreeD => TextureType::ThreeD,
            TextureTypeArg::Cubemap => TextureType::Cubemap,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Fast,
    Balanced,
    High,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Fast => Quality::Fast,
            QualityArg::Balanced => Quality::Balanced,
            QualityArg::High => Quality::High,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            format,
            texture_type,
            mipmaps,
            premultiply,
            quality,
        } => {
            let options = ConversionOptions {
                pixel_format: format.into(),
                texture_type: texture_type.into(),
                generate_mipmaps: mipmaps,
                premultiply_alpha: premultiply,
                quality: quality.into(),
            };
            cmd_convert(&inputs, &output, options)?;
        }
        Commands::Info { file, json } => {
            cmd_info(&file, json)?;
        }
        Commands::Export { file, output } => {
            cmd_export(&file, &output)?;
        }
        Commands::ExportAtlas { file, output, element } => {
            cmd_export_atlas(&file, &output, element.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn cmd_convert(inputs: &[String], output: &Path, options: ConversionOptions) -> Result<()> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No input images found");
    }

    println!(
        "Converting {} file(s) to {} {} (mipmaps: {}, premultiply: {}, quality: {})",
        files.len(),
        options.pixel_format,
        options.texture_type,
        options.generate_mipmaps,
        options.premultiply_alpha,
        options.quality
    );

    fs::create_dir_all(output).context("Failed to create output directory")?;

    let converter = Converter::new(options);
    let pb = progress_bar(files.len())?;

    let start = Instant::now();
    let outcomes = converter.convert_batch_with(&files, output, |outcome| {
        match &outcome.result {
            Ok(()) => pb.println(format!("✓ {} -> {}", outcome.input.display(), outcome.output.display())),
            Err(e) => pb.println(format!("✗ {}: {}", outcome.input.display(), e)),
        }
        pb.inc(1);
    })?;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    pb.finish_with_message("Done");
    println!(
        "Converted {} of {} file(s) in {:?}",
        files.len() - failed,
        files.len(),
        start.elapsed()
    );

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to convert", failed);
    }

    Ok(())
}

/// Expand files, directories and glob patterns into a sorted list of files.
fn collect_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_png(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        } else if path.exists() {
            files.insert(path.to_path_buf());
        } else {
            let matches = glob::glob(input).with_context(|| format!("Invalid glob pattern: {}", input))?;
            let before = files.len();
            for entry in matches {
                let entry = entry.context("Failed to read glob match")?;
                if entry.is_file() {
                    files.insert(entry);
                }
            }
            if files.len() == before {
                tracing::warn!(pattern = %input, "no files matched");
            }
        }
    }

    Ok(files.into_iter().collect())
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

fn cmd_info(file: &Path, json: bool) -> Result<()> {
    let loaded = load_container(file).with_context(|| format!("Failed to load {}", file.display()))?;

    if json {
        let levels: Vec<_> = loaded
            .levels()
            .iter()
            .map(|l| {
                serde_json::json!({
                    "width": l.width,
                    "height": l.height,
                    "pitch": l.pitch,
                    "size": l.payload.len(),
                })
            })
            .collect();
        let atlas = loaded.atlas.as_ref().map(|a| {
            serde_json::json!({
                "elements": a.elements,
                "warnings": a.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            })
        });
        let doc = serde_json::json!({
            "file": file.display().to_string(),
            "info": loaded.info,
            "flags": loaded.header().flags,
            "mipmaps": levels,
            "atlas": atlas,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let info = &loaded.info;
    println!("File:         {}", file.display());
    println!("Platform:     {}", info.platform);
    println!("Pixel format: {}", info.pixel_format);
    println!("Texture type: {}", info.texture_type);
    println!("Size:         {}x{}", info.width, info.height);
    println!("Mipmaps:      {}", info.mip_count);

    for (i, level) in loaded.levels().iter().enumerate() {
        println!(
            "  [{:>2}] {:>5}x{:<5} pitch {:>6} {:>10} bytes",
            i,
            level.width,
            level.height,
            level.pitch,
            level.payload.len()
        );
    }

    match &loaded.atlas {
        Some(atlas) => {
            println!("Atlas:        {} element(s)", atlas.elements.len());
            for element in &atlas.elements {
                println!("  {} at ({}, {})", element, element.x(), element.y());
            }
            for warning in &atlas.warnings {
                println!("  warning: {}", warning);
            }
        }
        None => println!("Atlas:        none"),
    }

    Ok(())
}

fn cmd_export(file: &Path, output: &Path) -> Result<()> {
    println!("Exporting: {} -> {}", file.display(), output.display());

    let loaded = load_container(file).with_context(|| format!("Failed to load {}", file.display()))?;
    export_raster(&loaded.image, output).context("Failed to write PNG")?;

    println!("Export complete");

    Ok(())
}

fn cmd_export_atlas(file: &Path, output: &Path, element: Option<&str>) -> Result<()> {
    let loaded = load_container(file).with_context(|| format!("Failed to load {}", file.display()))?;

    let atlas = loaded
        .atlas
        .as_ref()
        .with_context(|| format!("No atlas sidecar found for {}", file.display()))?;
    for warning in &atlas.warnings {
        eprintln!("warning: {}", warning);
    }

    let elements: Vec<AtlasElement> = match element {
        Some(name) => vec![atlas
            .find(name)
            .cloned()
            .with_context(|| format!("Atlas has no element named '{}'", name))?],
        None => atlas.elements.clone(),
    };

    println!("Exporting {} element(s) to {}...", elements.len(), output.display());

    let outcomes = export_atlas(&loaded.image, &elements, output).context("Failed to export atlas")?;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => println!("✓ {} -> {}", outcome.name, outcome.path.display()),
            Err(e) => {
                println!("✗ {}: {}", outcome.name, e);
                failed += 1;
            }
        }
    }

    println!("Exported {} of {} element(s)", outcomes.len() - failed, outcomes.len());

    if failed > 0 {
        anyhow::bail!("{} element(s) failed to export", failed);
    }

    Ok(())
}
