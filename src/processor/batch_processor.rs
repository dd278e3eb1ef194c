//! # Batch Processor
//!
//! Orchestratore principale: esegue le operazioni selezionate in ordine
//! (rinomina prima, poi compressione) delegando al motore.

use crate::{
    config::Config,
    error::ProcessError,
    image_processor::ImageProcessor,
    processor::progress_tracker::{OutputMode, ProgressTracker},
    progress::RunStats,
    renamer::Renamer,
    report::BatchReport,
};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Reports of every operation a run performed, in execution order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<BatchReport>,
}

impl RunSummary {
    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::new();
        for report in &self.reports {
            stats.add_report(report);
        }
        stats
    }

    /// Closing lines of a run; per-operation summaries are logged by the tracker
    pub fn final_lines(&self) -> Vec<String> {
        vec![
            "=== Processing Complete ===".to_string(),
            self.stats().format_summary(),
        ]
    }
}

/// Orchestratore di una run
pub struct BatchProcessor {
    config: Config,
    tracker: ProgressTracker,
}

impl BatchProcessor {
    /// Crea nuova istanza, validando la configurazione
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let tracker = ProgressTracker::new(OutputMode::from_config(&config));
        Ok(Self { config, tracker })
    }

    /// Esegue le operazioni selezionate su `dir`
    pub async fn run(&mut self, dir: &Path) -> Result<RunSummary> {
        if !dir.is_dir() {
            return Err(ProcessError::DirectoryNotFound(dir.to_path_buf()).into());
        }

        self.log_configuration(dir);
        let mut summary = RunSummary::default();

        if let Some(pattern) = self.config.rename_pattern.clone() {
            let report = Renamer::rename_by_pattern(dir, &pattern, self.config.start_number, &mut self.tracker).await?;
            summary.reports.push(report);
        } else if self.config.rename_by_date {
            let report = Renamer::rename_by_date(dir, &mut self.tracker).await?;
            summary.reports.push(report);
        }

        if self.config.compress {
            let processor = ImageProcessor::new(self.config.compression.clone());
            let report = processor.compress(dir, &mut self.tracker).await?;
            summary.reports.push(report);
        }

        self.print_final_stats(&summary);
        Ok(summary)
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self, dir: &Path) {
        if self.tracker.mode() == OutputMode::Json {
            return;
        }

        info!("Processing images in: {}", dir.display());

        if let Some(ref pattern) = self.config.rename_pattern {
            info!("Rename: {}{{n}} starting at {}", pattern, self.config.start_number);
        } else if self.config.rename_by_date {
            info!("Rename: by capture date (YYYYMMDD_HHMMSS)");
        }

        if self.config.compress {
            let params = &self.config.compression;
            info!(
                "Compress: quality {}, max {}x{}",
                params.quality, params.max_width, params.max_height
            );
            match params.output_dir {
                Some(ref output_dir) => info!("Output directory: {}", output_dir.display()),
                None => info!("Mode: Replace files in place"),
            }
        }
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, summary: &RunSummary) {
        if self.tracker.mode() == OutputMode::Json {
            return;
        }

        for line in summary.final_lines() {
            info!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Operation;
    use tempfile::TempDir;

    fn quiet(config: Config) -> Config {
        Config {
            show_progress: false,
            ..config
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(BatchProcessor::new(Config::default()).is_err());
    }

    #[tokio::test]
    async fn test_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut processor = BatchProcessor::new(quiet(Config {
            compress: true,
            ..Default::default()
        }))
        .unwrap();

        let err = processor.run(&temp_dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::DirectoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_runs_before_compress() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let img = image::RgbImage::from_pixel(30, 20, image::Rgb([10, 200, 30]));
        img.save(dir.join("b.png")).unwrap();
        img.save(dir.join("a.jpg")).unwrap();

        let mut processor = BatchProcessor::new(quiet(Config {
            rename_pattern: Some("img_".to_string()),
            compress: true,
            ..Default::default()
        }))
        .unwrap();
        let summary = processor.run(dir).await.unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.reports[0].operation, Operation::RenameByPattern);
        assert_eq!(summary.reports[0].succeeded(), 2);
        assert_eq!(summary.reports[1].operation, Operation::Compress);
        assert_eq!(summary.reports[1].succeeded(), 2);

        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        // img_2.png became img_2.jpg during compression
        assert_eq!(names, vec!["img_1.jpg", "img_2.jpg"]);

        let stats = summary.stats();
        assert_eq!(stats.files_done, 4);
        assert_eq!(stats.errors, 0);

        // operation summaries are not repeated at the end of the run
        let lines = summary.final_lines();
        assert_eq!(lines.len(), 2);
        assert!(!lines.contains(&summary.reports[1].format_summary()));
        assert!(lines[1].starts_with("Done: 4 | Skipped: 0 | Errors: 0"));
    }
}
