use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use walkdir::WalkDir;

use crate::config::{Config, OutputConfig};
use crate::exif;

/// Source extensions the decoders understand.
#[cfg(not(feature = "heic"))]
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff"];
#[cfg(feature = "heic")]
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "tif", "tiff", "heic", "heif",
];

/// The outcome of converting a single file.
///
/// A failed conversion carries its error here instead of aborting the batch.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub input: PathBuf,
    /// Destination path, once it could be derived.
    pub output: Option<PathBuf>,
    /// Size of the EXIF block carried into the output (0 if none).
    pub exif_bytes: usize,
    pub error: Option<String>,
}

impl ConvertResult {
    fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            exif_bytes: 0,
            error: None,
        }
    }

    fn failed(input: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(input)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Successful conversions that carried EXIF.
    pub with_exif: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ConvertResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            with_exif: results
                .iter()
                .filter(|r| r.is_ok() && r.exif_bytes > 0)
                .count(),
        }
    }
}

/// Collect supported source images from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only files with a supported extension
/// are included.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported source extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Destination for `input` inside `out_dir`: same stem, new extension.
pub fn output_path(input: &Path, out_dir: &Path, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("No file name in {}", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension.trim_start_matches('.'));
    Ok(out_dir.join(name))
}

/// Convert one image to JPEG in `out_dir`, carrying its EXIF block across.
///
/// Every file handle is opened and closed inside this call. Missing EXIF is
/// logged and the image is converted without it; any other failure is
/// recorded in the returned [`ConvertResult`] and a partially written output
/// is removed.
pub fn convert_image(input: &Path, out_dir: &Path, config: &OutputConfig) -> ConvertResult {
    let mut result = ConvertResult::new(input);
    if let Err(e) = try_convert(input, out_dir, config, &mut result) {
        result.error = Some(format!("{e:#}"));
    }
    result
}

fn try_convert(
    input: &Path,
    out_dir: &Path,
    config: &OutputConfig,
    result: &mut ConvertResult,
) -> Result<()> {
    let output = output_path(input, out_dir, &config.extension)?;
    result.output = Some(output.clone());

    if output.exists() && same_file(input, &output) {
        anyhow::bail!("Output {} would replace its own source", output.display());
    }

    let bytes = exif::Bytes::from(fs::read(input).context("Failed to read input file")?);

    if log::log_enabled!(log::Level::Debug) {
        match exif::read_summary(input) {
            Ok(summary) if !summary.is_empty() => log::debug!("  {summary:?}"),
            Ok(_) => {}
            Err(e) => log::debug!("  Could not summarise EXIF: {e}"),
        }
    }

    let (payload, image) = decode_source(bytes)?;
    match payload {
        Some(ref payload) => result.exif_bytes = payload.len(),
        None => log::warn!("No EXIF in {}, converting without metadata", input.display()),
    }

    if config.dry_run {
        log::info!("  Would write {}", output.display());
        return Ok(());
    }

    write_jpeg(&output, &image, payload.as_deref(), config)
}

/// Pull the EXIF block out of an encoded source and decode its pixels.
fn decode_source(bytes: exif::Bytes) -> Result<(Option<Vec<u8>>, DynamicImage)> {
    #[cfg(feature = "heic")]
    if crate::heif::is_heif(&bytes) {
        let payload = crate::heif::extract_exif(&bytes)?;
        return Ok((payload, crate::heif::decode(&bytes)?));
    }

    let payload = exif::extract_exif(bytes.clone());
    let image = image::load_from_memory(&bytes).context("Failed to decode image")?;
    Ok((payload, image))
}

/// Compare two paths by what they resolve to.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Encode `image` into a new file at `path` with `payload` spliced in as APP1.
fn write_jpeg(
    path: &Path,
    image: &DynamicImage,
    payload: Option<&[u8]>,
    config: &OutputConfig,
) -> Result<()> {
    let file = if config.overwrite {
        File::create(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)
    }
    .with_context(|| format!("Failed to create output file {}", path.display()))?;

    let written = encode_into(file, image, payload, config.quality);
    if written.is_err() {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Failed to remove partial output {}: {e}", path.display());
        }
    }
    written
}

fn encode_into(file: File, image: &DynamicImage, payload: Option<&[u8]>, quality: u8) -> Result<()> {
    let mut out = BufWriter::new(file);
    let mut sink = exif::embed_exif(&mut out, payload)?;

    // JPEG has no alpha and the encoder only takes 8-bit samples
    let rgb = image.to_rgb8();
    JpegEncoder::new_with_quality(&mut sink, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .context("Failed to encode JPEG")?;

    out.flush().context("Failed to write output file")?;
    Ok(())
}

/// Convert every input in order, one after another.
///
/// Returns one result per input, in input order. A failure is logged and the
/// batch moves on.
pub fn convert_all(inputs: &[PathBuf], out_dir: &Path, config: &Config) -> Vec<ConvertResult> {
    let total = inputs.len();
    let mut results = Vec::with_capacity(total);

    for (i, input) in inputs.iter().enumerate() {
        log::info!("[{}/{}] Converting: {}", i + 1, total, input.display());
        let result = convert_image(input, out_dir, &config.output);
        log_result(&result);
        results.push(result);
    }

    results
}

/// Convert inputs on tokio's blocking pool, at most `config.batch.jobs` at a time.
///
/// Same contract as [`convert_all`]: one result per input, in input order.
pub async fn convert_all_parallel(
    inputs: &[PathBuf],
    out_dir: &Path,
    config: &Config,
) -> Vec<ConvertResult> {
    let limit = Arc::new(Semaphore::new(config.batch.jobs.max(1)));
    let output = Arc::new(config.output.clone());
    let out_dir = Arc::new(out_dir.to_path_buf());
    let total = inputs.len();

    let mut handles = Vec::with_capacity(total);
    for (i, input) in inputs.iter().enumerate() {
        let permit = match Arc::clone(&limit).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                handles.push((input.clone(), None, Some(e.to_string())));
                continue;
            }
        };

        log::info!("[{}/{}] Converting: {}", i + 1, total, input.display());
        let output = Arc::clone(&output);
        let out_dir = Arc::clone(&out_dir);
        let path = input.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let result = convert_image(&path, &out_dir, &output);
            log_result(&result);
            result
        });
        handles.push((input.clone(), Some(handle), None));
    }

    let mut results = Vec::with_capacity(total);
    for (input, handle, error) in handles {
        let result = match (handle, error) {
            (Some(handle), _) => match handle.await {
                Ok(result) => result,
                Err(e) => ConvertResult::failed(&input, format!("Conversion task failed: {e}")),
            },
            (None, error) => ConvertResult::failed(
                &input,
                format!("Conversion not started: {}", error.unwrap_or_default()),
            ),
        };
        results.push(result);
    }

    results
}

fn log_result(result: &ConvertResult) {
    let output = result
        .output
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    match result.error {
        Some(ref err) => log::error!("  {}: {err}", result.input.display()),
        None if result.exif_bytes > 0 => {
            log::info!("  {} -> {output} ({} bytes EXIF)", result.input.display(), result.exif_bytes)
        }
        None => log::info!("  {} -> {output}", result.input.display()),
    }
}
