//! # Renamer Module
//!
//! The two rename operations of the engine.
//!
//! ## Rename by pattern
//! Files are numbered in listing order starting from `start_number`:
//! `pattern + number + extension`. A target that already exists on disk is
//! never overwritten; the file is skipped and its number is consumed anyway,
//! so the following files keep the numbers they would have had.
//!
//! ## Rename by capture date
//! Files are named `YYYYMMDD_HHMMSS` from their capture timestamp (see
//! `capture_date`). When the name is taken by another file, `_1`, `_2`, ...
//! is appended to the base name until a free name is found. A file already
//! carrying its resolved name is left alone.
//!
//! Both operations are strictly sequential and never roll back: a failure on
//! one file is recorded and the next file is processed.

use crate::{
    capture_date::capture_timestamp,
    error::ProcessError,
    file_manager::{FileManager, ImageFile},
    processor::ProgressTracker,
    report::{BatchReport, FileOutcome, Operation, SkipReason},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct Renamer;

impl Renamer {
    /// Rename every image to `pattern{n}.{ext}`, `n` counting from `start_number`
    pub async fn rename_by_pattern(
        dir: &Path,
        pattern: &str,
        start_number: u64,
        tracker: &mut ProgressTracker,
    ) -> Result<BatchReport> {
        let files = FileManager::list_images(dir)?;
        let mut report = BatchReport::new(Operation::RenameByPattern);
        tracker.start(Operation::RenameByPattern, dir, files.len());

        for (number, file) in (start_number..).zip(files.iter()) {
            let target = dir.join(Self::pattern_name(pattern, number, &file.extension));
            let outcome = Self::rename_to(file, &target).await;
            tracker.record(&outcome);
            report.push(outcome);
        }

        tracker.finish(&report);
        Ok(report)
    }

    /// Rename every image after its capture timestamp
    pub async fn rename_by_date(dir: &Path, tracker: &mut ProgressTracker) -> Result<BatchReport> {
        let files = FileManager::list_images(dir)?;
        let mut report = BatchReport::new(Operation::RenameByDate);
        tracker.start(Operation::RenameByDate, dir, files.len());

        for file in &files {
            let outcome = Self::rename_file_by_date(dir, file).await;
            tracker.record(&outcome);
            report.push(outcome);
        }

        tracker.finish(&report);
        Ok(report)
    }

    pub fn pattern_name(pattern: &str, number: u64, extension: &str) -> String {
        format!("{}{}.{}", pattern, number, extension)
    }

    /// Rename unless the target is taken
    async fn rename_to(file: &ImageFile, target: &Path) -> FileOutcome {
        if target.exists() {
            return FileOutcome::Skipped {
                path: file.path.clone(),
                reason: SkipReason::TargetExists { target: target.to_path_buf() },
            };
        }

        match fs::rename(&file.path, target).await {
            Ok(()) => FileOutcome::Renamed {
                from: file.path.clone(),
                to: target.to_path_buf(),
            },
            Err(e) => FileOutcome::failed(&file.path, ProcessError::Io(e)),
        }
    }

    async fn rename_file_by_date(dir: &Path, file: &ImageFile) -> FileOutcome {
        let path = file.path.clone();
        let timestamp = match tokio::task::spawn_blocking(move || capture_timestamp(&path)).await {
            Ok(Ok(timestamp)) => timestamp,
            Ok(Err(ProcessError::UnresolvableDate(_))) => {
                return FileOutcome::Skipped {
                    path: file.path.clone(),
                    reason: SkipReason::UnresolvableDate,
                };
            }
            Ok(Err(e)) => return FileOutcome::failed(&file.path, e),
            Err(e) => return FileOutcome::failed(&file.path, e),
        };
        debug!("{}: captured {} ({:?})", file.file_name(), timestamp.format(), timestamp.source);

        let target = Self::resolve_free_name(dir, &file.path, &timestamp.format(), &file.extension);
        if target == file.path {
            return FileOutcome::Skipped {
                path: file.path.clone(),
                reason: SkipReason::AlreadyNamed,
            };
        }

        match fs::rename(&file.path, &target).await {
            Ok(()) => FileOutcome::Renamed {
                from: file.path.clone(),
                to: target,
            },
            Err(e) => FileOutcome::failed(&file.path, ProcessError::Io(e)),
        }
    }

    /// First of `base.ext`, `base_1.ext`, `base_2.ext`, ... that is free or is `source` itself
    pub fn resolve_free_name(dir: &Path, source: &Path, base: &str, extension: &str) -> PathBuf {
        let mut candidate = dir.join(format!("{}.{}", base, extension));
        let mut counter = 1u64;

        while candidate.exists() && candidate != source {
            candidate = dir.join(format!("{}_{}.{}", base, counter, extension));
            counter += 1;
        }

        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_date::tests::jpeg_with_exif;
    use exif::Tag;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_rename_by_pattern_numbers_in_listing_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["c.PNG", "a.jpg", "b.jpeg", "readme.txt"] {
            touch(dir, name);
        }

        let report = Renamer::rename_by_pattern(dir, "img_", 5, &mut ProgressTracker::quiet()).await.unwrap();

        assert_eq!(report.succeeded(), 3);
        assert_eq!(names(dir), vec!["img_5.jpg", "img_6.jpeg", "img_7.png", "readme.txt"]);
        // contents follow the listing order a.jpg, b.jpeg, c.PNG
        assert_eq!(std::fs::read(dir.join("img_6.jpeg")).unwrap(), b"b.jpeg");
    }

    #[tokio::test]
    async fn test_rename_by_pattern_skips_without_renumbering() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["a.jpg", "b.jpg", "c.jpg", "photo_2.jpg"] {
            touch(dir, name);
        }

        let report = Renamer::rename_by_pattern(dir, "photo_", 1, &mut ProgressTracker::quiet()).await.unwrap();

        // a -> photo_1, b -> photo_2 collides, c -> photo_3, photo_2.jpg -> photo_4
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.skipped(), 1);
        assert_eq!(names(dir), vec!["b.jpg", "photo_1.jpg", "photo_2.jpg", "photo_3.jpg", "photo_4.jpg"]);
        assert_eq!(std::fs::read(dir.join("photo_3.jpg")).unwrap(), b"c.jpg");
        assert!(matches!(
            &report.outcomes[1],
            FileOutcome::Skipped { reason: SkipReason::TargetExists { .. }, .. }
        ));
    }

    #[tokio::test]
    async fn test_rename_by_pattern_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "image_1.jpg");
        touch(dir, "image_2.jpg");

        let report = Renamer::rename_by_pattern(dir, "image_", 1, &mut ProgressTracker::quiet()).await.unwrap();

        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.skipped(), 2);
        assert_eq!(names(dir), vec!["image_1.jpg", "image_2.jpg"]);
    }

    #[tokio::test]
    async fn test_rename_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = Renamer::rename_by_pattern(
            &temp_dir.path().join("missing"),
            "x_",
            1,
            &mut ProgressTracker::quiet(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rename_by_date_resolves_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let jpeg = jpeg_with_exif(&[(Tag::DateTimeOriginal, "2023:01:01 12:00:00")]);
        std::fs::write(dir.join("a.JPG"), &jpeg).unwrap();
        std::fs::write(dir.join("b.jpg"), &jpeg).unwrap();

        let report = Renamer::rename_by_date(dir, &mut ProgressTracker::quiet()).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(names(dir), vec!["20230101_120000.jpg", "20230101_120000_1.jpg"]);
        assert_eq!(
            report.outcomes[1],
            FileOutcome::Renamed {
                from: dir.join("b.jpg"),
                to: dir.join("20230101_120000_1.jpg"),
            }
        );

        // second run finds every file already named
        let report = Renamer::rename_by_date(dir, &mut ProgressTracker::quiet()).await.unwrap();
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.skipped(), 2);
        assert_eq!(names(dir), vec!["20230101_120000.jpg", "20230101_120000_1.jpg"]);
    }

    #[tokio::test]
    async fn test_rename_by_date_without_exif_uses_modified_time() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "scan.bmp");

        let expected = crate::capture_date::modified_timestamp(&dir.join("scan.bmp")).unwrap().format();
        let report = Renamer::rename_by_date(dir, &mut ProgressTracker::quiet()).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(names(dir), vec![format!("{}.bmp", expected)]);
    }

    #[test]
    fn test_resolve_free_name() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "20230101_120000.jpg");
        touch(dir, "20230101_120000_1.jpg");

        let source = dir.join("other.jpg");
        assert_eq!(
            Renamer::resolve_free_name(dir, &source, "20230101_120000", "jpg"),
            dir.join("20230101_120000_2.jpg")
        );

        // a file that already holds a counter name resolves to itself
        let source = dir.join("20230101_120000_1.jpg");
        assert_eq!(Renamer::resolve_free_name(dir, &source, "20230101_120000", "jpg"), source);
    }

    #[test]
    fn test_pattern_name() {
        assert_eq!(Renamer::pattern_name("holiday-", 12, "jpeg"), "holiday-12.jpeg");
    }
}
