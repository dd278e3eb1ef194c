//! # Batch Report Module
//!
//! Per-file outcomes and the report each engine operation returns.
//!
//! Every file handled by an operation ends in exactly one `FileOutcome`:
//! done (renamed or compressed), skipped with a reason, or failed with an
//! error message. The outcomes are collected in listing order into a
//! `BatchReport`, which gives the count the caller shows and one log line per
//! file. Nothing is written to a display from inside the engine.

use crate::file_manager::FileManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RenameByPattern,
    RenameByDate,
    Compress,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RenameByPattern => "rename",
            Self::RenameByDate => "rename by date",
            Self::Compress => "compress",
        }
    }

    /// Past-tense verb for summary lines
    fn verb(&self) -> &'static str {
        match self {
            Self::RenameByPattern => "Renamed",
            Self::RenameByDate => "Renamed by capture date",
            Self::Compress => "Compressed",
        }
    }
}

/// Why a file was left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The computed name is already taken on disk
    TargetExists { target: PathBuf },
    /// The file already carries its computed name
    AlreadyNamed,
    /// Neither EXIF nor the modified time gave a timestamp
    UnresolvableDate,
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Renamed {
        from: PathBuf,
        to: PathBuf,
    },
    Compressed {
        source: PathBuf,
        output: PathBuf,
        original_size: u64,
        new_size: u64,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl FileOutcome {
    pub fn failed(path: &Path, error: impl fmt::Display) -> Self {
        Self::Failed {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }

    /// The file the outcome is about
    pub fn path(&self) -> &Path {
        match self {
            Self::Renamed { from, .. } => from,
            Self::Compressed { source, .. } => source,
            Self::Skipped { path, .. } | Self::Failed { path, .. } => path,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Renamed { .. } | Self::Compressed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Size reduction in percent, only for compressed files
    pub fn reduction_percent(&self) -> Option<f64> {
        match self {
            Self::Compressed { original_size, new_size, .. } => {
                Some(FileManager::calculate_reduction(*original_size, *new_size))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renamed { from, to } => {
                write!(f, "Renamed: {} -> {}", name_of(from), name_of(to))
            }
            Self::Compressed { source, output, original_size, new_size } => {
                let reduction = FileManager::calculate_reduction(*original_size, *new_size);
                let change = if reduction < 0.0 {
                    format!("{:.1}% larger", -reduction)
                } else {
                    format!("{:.1}% smaller", reduction)
                };
                if name_of(source) != name_of(output) {
                    write!(
                        f,
                        "Converted: {} -> {} ({} -> {} bytes, {})",
                        name_of(source), name_of(output), original_size, new_size, change
                    )
                } else {
                    write!(
                        f,
                        "Compressed: {} ({} -> {} bytes, {})",
                        name_of(source), original_size, new_size, change
                    )
                }
            }
            Self::Skipped { path, reason } => match reason {
                SkipReason::TargetExists { target } => {
                    write!(f, "Skipped {}: {} already exists", name_of(path), name_of(target))
                }
                SkipReason::AlreadyNamed => {
                    write!(f, "Skipped {}: already named by capture date", name_of(path))
                }
                SkipReason::UnresolvableDate => {
                    write!(f, "Skipped {}: capture date unavailable", name_of(path))
                }
            },
            Self::Failed { path, error } => write!(f, "Failed {}: {}", name_of(path), error),
        }
    }
}

/// Outcomes of one operation over one directory, in listing order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub operation: Operation,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    /// Files actually renamed or compressed
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_done()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Total bytes saved by compressed files (growth counts as zero)
    pub fn bytes_saved(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                FileOutcome::Compressed { original_size, new_size, .. } => {
                    original_size.saturating_sub(*new_size)
                }
                _ => 0,
            })
            .sum()
    }

    /// One line per file, in processing order
    pub fn log_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.to_string()).collect()
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!("{} {} files", self.operation.verb(), self.succeeded());
        if self.skipped() > 0 || self.failed() > 0 {
            summary.push_str(&format!(" ({} skipped, {} failed)", self.skipped(), self.failed()));
        }
        if self.operation == Operation::Compress && self.succeeded() > 0 {
            summary.push_str(&format!(", saved {}", FileManager::format_size(self.bytes_saved())));
        }
        summary
    }
}
