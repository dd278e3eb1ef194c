//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery non ricorsiva delle immagini in una directory
//! - Filtro per estensione (case-insensitive) sulla allow-list
//! - Ordinamento deterministico per nome file
//! - Utilità per dimensioni e percentuali di riduzione
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG, BMP, TIFF, WebP
//!
//! ## Operazioni sui file:
//! - `list_images()`: Trova le immagini direttamente dentro una directory
//! - `file_size()`: Ottiene la dimensione in bytes
//!
//! ## Utilità:
//! - `format_size()`: Converte bytes in formato leggibile (KB, MB, GB)
//! - `calculate_reduction()`: Calcola percentuale di riduzione
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::list_images(Path::new("/path/to/photos"))?;
//! for file in files {
//!     println!("{} ({})", file.file_name(), file.extension);
//! }
//! ```

use crate::error::ProcessError;
use anyhow::Result;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Extensions the engine will touch, lowercase
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// An image found by discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    /// Lowercase extension without the dot
    pub extension: String,
}

impl ImageFile {
    /// Build from a path, `None` unless the extension is allow-listed
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self {
                path: path.to_path_buf(),
                extension,
            })
        } else {
            None
        }
    }

    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default()
    }

    /// File name without the extension
    pub fn stem(&self) -> Cow<'_, str> {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default()
    }

    pub fn is_jpeg(&self) -> bool {
        matches!(self.extension.as_str(), "jpg" | "jpeg")
    }

    pub fn is_png(&self) -> bool {
        self.extension == "png"
    }

    pub fn is_webp(&self) -> bool {
        self.extension == "webp"
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// List the supported images directly inside `dir`, sorted by file name
    pub fn list_images(dir: &Path) -> Result<Vec<ImageFile>> {
        if !dir.is_dir() {
            return Err(ProcessError::DirectoryNotFound(dir.to_path_buf()).into());
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Some(image) = ImageFile::from_path(entry.path()) {
                files.push(image);
            }
        }

        files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        Ok(files)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"data").unwrap();
    }

    #[test]
    fn test_list_images_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.Jpeg", "d.webp", "e.tiff", "f.bmp", "g.gif", "noext"] {
            touch(dir, name);
        }

        let files = FileManager::list_images(dir).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name().into_owned()).collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.Jpeg", "d.webp", "e.tiff", "f.bmp"]);

        assert_eq!(files[1].extension, "png");
        assert_eq!(files[2].extension, "jpeg");
    }

    #[test]
    fn test_list_images_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "top.jpg");
        std::fs::create_dir(dir.join("nested.jpg")).unwrap();
        touch(&dir.join("nested.jpg"), "inner.jpg");

        let files = FileManager::list_images(dir).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "top.jpg");
    }

    #[test]
    fn test_list_images_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileManager::list_images(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_image_file_kinds() {
        let jpg = ImageFile::from_path(Path::new("/x/IMG.JPG")).unwrap();
        assert!(jpg.is_jpeg());
        assert_eq!(jpg.stem(), "IMG");
        assert!(ImageFile::from_path(Path::new("/x/a.png")).unwrap().is_png());
        assert!(ImageFile::from_path(Path::new("/x/a.WebP")).unwrap().is_webp());
        assert!(ImageFile::from_path(Path::new("/x/a.heic")).is_none());
        assert!(ImageFile::from_path(Path::new("/x/a")).is_none());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(1000, 250), 75.0);
        assert_eq!(FileManager::calculate_reduction(1000, 1500), -50.0);
        // zero-byte original reports no reduction instead of dividing by zero
        assert_eq!(FileManager::calculate_reduction(0, 1234), 0.0);
    }

    #[tokio::test]
    async fn test_file_size_ignores_pre_epoch_mtime() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.jpg");
        let path = temp_dir.path().join("a.jpg");
        let before_epoch = SystemTime::UNIX_EPOCH - Duration::from_secs(10 * 365 * 24 * 3600);
        std::fs::File::options().write(true).open(&path).unwrap().set_modified(before_epoch).unwrap();

        assert_eq!(FileManager::file_size(&path).await.unwrap(), 4);
    }
}
