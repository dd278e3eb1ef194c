//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di una run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Log per file stampati sopra la barra senza romperla
//! - Statistiche aggregate sulle operazioni eseguite (file fatti, saltati, errori)
//!
//! ## Componenti principali:
//! - `ProgressManager`: Gestisce la progress bar di un'operazione
//! - `RunStats`: Somma i `BatchReport` di una run
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:04] [========================>---------------] 12/20 (60%) Compressed: photo.jpg (...)
//! ```
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new(total_files, "compress");
//! progress.update("Compressed: photo.jpg");
//! progress.finish("Compressed 20 files");
//! ```

use crate::file_manager::FileManager;
use crate::report::BatchReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages the progress bar of one operation
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64, operation: &str) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_prefix(operation.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Run `f` with the bar hidden, so log output does not tear it
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        self.bar.suspend(f);
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Totals over every operation of a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub files_done: usize,
    pub files_skipped: usize,
    pub errors: usize,
    pub total_bytes_saved: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_report(&mut self, report: &BatchReport) {
        self.files_done += report.succeeded();
        self.files_skipped += report.skipped();
        self.errors += report.failed();
        self.total_bytes_saved += report.bytes_saved();
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Done: {} | Skipped: {} | Errors: {} | Total saved: {}",
            self.files_done,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
        )
    }
}
