//! # Error Types Module
//!
//! Custom error types for the batch engine.
//!
//! ## Categories:
//! - `DirectoryNotFound`: the target directory is missing (fatal, checked before any file is touched)
//! - `TargetNameCollision`: a computed file name is already taken
//! - `MetadataUnavailable`: no usable EXIF date, the caller falls back to the modified time
//! - `UnresolvableDate`: neither EXIF nor the modified time gave a timestamp
//! - `Decode` / `Encode`: codec failures while compressing
//! - `Io`: filesystem failures
//! - `Validation`: invalid parameters
//!
//! Everything except `DirectoryNotFound` and `Validation` is local to one file:
//! the engine turns it into a `FileOutcome` and moves on to the next file.
//!
//! ## Example:
//! ```rust,ignore
//! if !dir.is_dir() {
//!     return Err(ProcessError::DirectoryNotFound(dir.to_path_buf()).into());
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for batch processing
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Target name already exists: {}", .0.display())]
    TargetNameCollision(PathBuf),

    #[error("Capture metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Could not determine a date for {}", .0.display())]
    UnresolvableDate(PathBuf),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameters: {0}")]
    Validation(String),
}
