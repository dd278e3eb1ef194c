//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output della compressione.
//! Evita duplicazione tra ImageProcessor e i test.

use crate::{file_manager::ImageFile, image_processor::TargetFormat};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output per un file dato
    pub fn get_output_path(file: &ImageFile, target: TargetFormat, output_dir: Option<&Path>) -> PathBuf {
        let filename = Self::get_output_file_name(file, target);

        let result = match output_dir {
            Some(dir) => dir.join(filename),
            None => file.path.with_file_name(filename),
        };
        debug!("Resolved output path: {} -> {}", file.path.display(), result.display());
        result
    }

    /// Only a PNG turned into JPEG changes its name; every other file keeps it
    fn get_output_file_name(file: &ImageFile, target: TargetFormat) -> String {
        if file.is_png() && target == TargetFormat::Jpeg {
            format!("{}.jpg", file.stem())
        } else {
            file.file_name().into_owned()
        }
    }

    /// Parent directory, `.` for a bare file name
    pub fn parent_dir(path: &Path) -> &Path {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    /// Crea le directory parent se necessario
    pub async fn ensure_parent_dirs(path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(Self::parent_dir(path)).await
            .map_err(|e| anyhow::anyhow!("Failed to create parent directories for {}: {}", path.display(), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(path: &str) -> ImageFile {
        ImageFile::from_path(Path::new(path)).unwrap()
    }

    #[test]
    fn test_png_to_jpeg_changes_extension() {
        let file = image("/photos/Shot.PNG");
        assert_eq!(
            PathResolver::get_output_path(&file, TargetFormat::Jpeg, None),
            PathBuf::from("/photos/Shot.jpg")
        );
        assert_eq!(
            PathResolver::get_output_path(&file, TargetFormat::Png, None),
            PathBuf::from("/photos/Shot.PNG")
        );
    }

    #[test]
    fn test_output_dir_keeps_name() {
        let file = image("/photos/scan.bmp");
        assert_eq!(
            PathResolver::get_output_path(&file, TargetFormat::Jpeg, Some(Path::new("/out"))),
            PathBuf::from("/out/scan.bmp")
        );

        let file = image("/photos/a.png");
        assert_eq!(
            PathResolver::get_output_path(&file, TargetFormat::Jpeg, Some(Path::new("/out"))),
            PathBuf::from("/out/a.jpg")
        );
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(PathResolver::parent_dir(Path::new("a.jpg")), Path::new("."));
        assert_eq!(PathResolver::parent_dir(Path::new("/x/a.jpg")), Path::new("/x"));
    }
}
