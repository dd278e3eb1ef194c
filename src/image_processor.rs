//! # Image Processing Module
//!
//! The compress operation: decode, downscale, re-encode, write.
//!
//! ## Encode policy
//!
//! | Source     | Output                                   | Encoder |
//! |------------|------------------------------------------|---------|
//! | JPEG       | JPEG at `quality`, optimized coding      | mozjpeg |
//! | PNG, q<100 | JPEG at `quality`, extension `.jpg`      | mozjpeg |
//! | PNG, q=100 | PNG, lossless                            | image + oxipng |
//! | WebP       | WebP at `quality`, method 6              | libwebp |
//! | BMP, TIFF  | JPEG at `quality`, file name unchanged   | mozjpeg |
//!
//! Every JPEG output is flattened onto an opaque white background first, so
//! transparent areas turn white instead of black.
//!
//! ## Resizing
//! Images larger than `max_width` x `max_height` are scaled down with
//! Lanczos3 by `min(max_w / w, max_h / h)`, keeping the aspect ratio. Smaller
//! images are never upscaled.
//!
//! ## Writing
//! The encoded bytes go to a temporary file next to the destination which is
//! then persisted over it, so a failed file never leaves a truncated original.
//! In place, a PNG converted to JPEG replaces the source: the `.png` is removed
//! once the `.jpg` is written. A `.jpg` name held by another file is never
//! overwritten.
//!
//! ## Example
//! ```rust,ignore
//! let processor = ImageProcessor::new(CompressionParams::default());
//! let report = processor.compress(Path::new("/photos"), &mut ProgressTracker::quiet()).await?;
//! println!("{}", report.format_summary());
//! ```

use crate::{
    config::CompressionParams,
    error::ProcessError,
    file_manager::{FileManager, ImageFile},
    processor::{PathResolver, ProgressTracker},
    report::{BatchReport, FileOutcome, Operation},
};
use anyhow::Result;
use image::{imageops::FilterType, DynamicImage, ImageOutputFormat, RgbImage};
use mozjpeg::{ColorSpace, Compress};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, warn};

/// libwebp compression effort, 6 is the slowest and smallest
const WEBP_METHOD: i32 = 6;

/// oxipng optimization preset for lossless PNG output
const OXIPNG_PRESET: u8 = 6;

/// Format written for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
    WebP,
}

impl TargetFormat {
    /// Pick the output format of a file under the encode policy
    pub fn for_file(file: &ImageFile, params: &CompressionParams) -> Self {
        if file.is_webp() {
            Self::WebP
        } else if file.is_png() && !params.wants_lossy_png() {
            Self::Png
        } else {
            Self::Jpeg
        }
    }
}

/// Runs the compress operation over a directory
pub struct ImageProcessor {
    params: CompressionParams,
}

impl ImageProcessor {
    pub fn new(params: CompressionParams) -> Self {
        Self { params }
    }

    /// Compress every image of `dir`, one after the other
    pub async fn compress(&self, dir: &Path, tracker: &mut ProgressTracker) -> Result<BatchReport> {
        self.params.validate()?;
        let files = FileManager::list_images(dir)?;

        if let Some(ref output_dir) = self.params.output_dir {
            fs::create_dir_all(output_dir).await.map_err(|e| {
                anyhow::anyhow!("Failed to create output directory {}: {}", output_dir.display(), e)
            })?;
        }

        let mut report = BatchReport::new(Operation::Compress);
        let mut written = HashSet::new();
        tracker.start(Operation::Compress, dir, files.len());

        for file in &files {
            let outcome = match self.compress_file(file, &mut written).await {
                Ok(outcome) => outcome,
                Err(e) => FileOutcome::failed(&file.path, format!("{:#}", e)),
            };
            tracker.record(&outcome);
            report.push(outcome);
        }

        tracker.finish(&report);
        Ok(report)
    }

    /// Compress a single file and describe what happened.
    ///
    /// `written` holds the outputs produced earlier in the batch; none of them
    /// is ever overwritten.
    pub async fn compress_file(&self, file: &ImageFile, written: &mut HashSet<PathBuf>) -> Result<FileOutcome> {
        let original_size = FileManager::file_size(&file.path).await?;

        let target = TargetFormat::for_file(file, &self.params);
        let output_path = PathResolver::get_output_path(file, target, self.params.output_dir.as_deref());
        let replaces_source = self.params.output_dir.is_none() && output_path != file.path;

        if written.contains(&output_path) || (replaces_source && output_path.exists()) {
            return Err(ProcessError::TargetNameCollision(output_path).into());
        }

        let bytes = fs::read(&file.path).await?;
        let params = self.params.clone();
        let encoded = tokio::task::spawn_blocking(move || encode_image(&bytes, target, &params)).await??;

        PathResolver::ensure_parent_dirs(&output_path).await?;
        write_atomically(&file.path, &output_path, encoded).await?;

        if replaces_source {
            fs::remove_file(&file.path).await?;
            debug!("Removed converted source {}", file.path.display());
        }

        let new_size = FileManager::file_size(&output_path).await?;
        written.insert(output_path.clone());
        if new_size > original_size {
            warn!("{} grew from {} to {} bytes", file.file_name(), original_size, new_size);
        }

        Ok(FileOutcome::Compressed {
            source: file.path.clone(),
            output: output_path,
            original_size,
            new_size,
        })
    }
}

/// Decode, downscale and re-encode in memory
pub fn encode_image(bytes: &[u8], target: TargetFormat, params: &CompressionParams) -> Result<Vec<u8>, ProcessError> {
    let img = image::load_from_memory(bytes)?;
    let img = downscale(img, params.max_width, params.max_height);

    match target {
        TargetFormat::Jpeg => encode_jpeg(&flatten_onto_white(&img), params.quality),
        TargetFormat::Png => encode_png(&img),
        TargetFormat::WebP => encode_webp(&img, params.quality),
    }
}

/// Target size when `(width, height)` exceeds the box, `None` when it fits
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width <= max_width && height <= max_height {
        return None;
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    Some((new_width, new_height))
}

fn downscale(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    match fit_within(img.width(), img.height(), max_width, max_height) {
        Some((width, height)) => {
            debug!("Resizing {}x{} -> {}x{}", img.width(), img.height(), width, height);
            img.resize_exact(width, height, FilterType::Lanczos3)
        }
        None => img,
    }
}

/// Composite onto opaque white, dropping the alpha channel
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// libjpeg errors unwind out of mozjpeg, so they are caught here and turned
/// into an error for this file only
fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ProcessError> {
    let encode_err = |e: std::io::Error| ProcessError::Encode(format!("jpeg: {}", e));

    let result = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(rgb.width() as usize, rgb.height() as usize);
        comp.set_quality(quality as f32);
        comp.set_optimize_coding(true);

        let mut dest = Vec::new();
        let mut writer = comp.start_compress(&mut dest)?;
        writer.write_scanlines(rgb.as_raw())?;
        writer.finish()?;
        Ok(dest)
    }));

    match result {
        Ok(encoded) => encoded.map_err(encode_err),
        Err(payload) => {
            let message = payload
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| payload.downcast_ref::<&str>().copied())
                .unwrap_or("libjpeg error");
            Err(ProcessError::Encode(format!("jpeg: {}", message)))
        }
    }
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ProcessError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Png)?;

    let options = oxipng::Options::from_preset(OXIPNG_PRESET);
    oxipng::optimize_from_memory(&cursor.into_inner(), &options)
        .map_err(|e| ProcessError::Encode(format!("png: {}", e)))
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessError> {
    let mut config = webp::WebPConfig::new()
        .map_err(|_| ProcessError::Encode("webp: invalid encoder configuration".to_string()))?;
    config.quality = quality as f32;
    config.method = WEBP_METHOD;

    let (pixels, has_alpha) = if img.color().has_alpha() {
        (img.to_rgba8().into_raw(), true)
    } else {
        (img.to_rgb8().into_raw(), false)
    };

    let encoder = if has_alpha {
        webp::Encoder::from_rgba(&pixels, img.width(), img.height())
    } else {
        webp::Encoder::from_rgb(&pixels, img.width(), img.height())
    };
    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| ProcessError::Encode(format!("webp: {:?}", e)))?;

    Ok(memory.to_vec())
}

/// Write through a temporary file in the destination directory, keeping the source permissions
async fn write_atomically(source: &Path, destination: &Path, data: Vec<u8>) -> Result<()> {
    let source: PathBuf = source.to_path_buf();
    let destination: PathBuf = destination.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut tmp = NamedTempFile::new_in(PathResolver::parent_dir(&destination))?;
        tmp.write_all(&data)?;
        if let Ok(metadata) = std::fs::metadata(&source) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        tmp.persist(&destination).map_err(|e| e.error)?;
        Ok(())
    })
    .await?
}
