//! # Progress Tracking Module
//!
//! Single reporting channel for the engine operations. Depending on the
//! output mode it drives a progress bar, emits JSON events, or only logs.

use crate::{
    config::Config,
    json_output::JsonMessage,
    progress::ProgressManager,
    report::{BatchReport, FileOutcome, Operation},
};
use std::path::Path;
use tracing::{error, info, warn};

/// How progress is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Progress bar plus log lines
    Interactive,
    /// One JSON event per line on stdout
    Json,
    /// Log lines only
    Quiet,
}

impl OutputMode {
    pub fn from_config(config: &Config) -> Self {
        if config.json_output {
            Self::Json
        } else if config.show_progress {
            Self::Interactive
        } else {
            Self::Quiet
        }
    }
}

/// Reports per-file outcomes of the operation in progress
pub struct ProgressTracker {
    mode: OutputMode,
    total_files: usize,
    current_file: usize,
    progress_manager: Option<ProgressManager>,
}

impl ProgressTracker {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            total_files: 0,
            current_file: 0,
            progress_manager: None,
        }
    }

    /// Tracker that only logs, for library callers and tests
    pub fn quiet() -> Self {
        Self::new(OutputMode::Quiet)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Begin an operation over `total_files` files
    pub fn start(&mut self, operation: Operation, directory: &Path, total_files: usize) {
        self.total_files = total_files;
        self.current_file = 0;

        match self.mode {
            OutputMode::Json => {
                JsonMessage::start(operation, directory.to_path_buf(), total_files).emit();
            }
            OutputMode::Interactive => {
                info!("Starting {} in: {} ({} images)", operation.label(), directory.display(), total_files);
                self.progress_manager = Some(ProgressManager::new(total_files as u64, operation.label()));
            }
            OutputMode::Quiet => {
                info!("Starting {} in: {} ({} images)", operation.label(), directory.display(), total_files);
            }
        }
    }

    /// Record the outcome of the next file
    pub fn record(&mut self, outcome: &FileOutcome) {
        let index = self.current_file;
        self.current_file += 1;

        match self.mode {
            OutputMode::Json => {
                JsonMessage::file_complete(index, self.total_files, outcome).emit();
            }
            OutputMode::Interactive => {
                if let Some(ref progress) = self.progress_manager {
                    progress.suspend(|| Self::log_outcome(outcome));
                    progress.update(&outcome.to_string());
                } else {
                    Self::log_outcome(outcome);
                }
            }
            OutputMode::Quiet => Self::log_outcome(outcome),
        }
    }

    /// Close the operation with its report
    pub fn finish(&mut self, report: &BatchReport) {
        let summary = report.format_summary();

        match self.mode {
            OutputMode::Json => JsonMessage::operation_complete(report).emit(),
            OutputMode::Interactive => {
                if let Some(progress) = self.progress_manager.take() {
                    progress.finish(&summary);
                }
                info!("{}", summary);
            }
            OutputMode::Quiet => info!("{}", summary),
        }
    }

    fn log_outcome(outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Renamed { .. } | FileOutcome::Compressed { .. } => info!("{}", outcome),
            FileOutcome::Skipped { .. } => warn!("{}", outcome),
            FileOutcome::Failed { .. } => error!("{}", outcome),
        }
    }
}
