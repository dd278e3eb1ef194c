//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con le operazioni selezionate e i loro parametri
//! - Definisce `CompressionParams` (qualità, dimensioni massime, directory di output)
//! - Fornisce validazione dei parametri prima che un qualsiasi file venga toccato
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `rename_pattern`: Prefisso per la rinomina sequenziale (default: None)
//! - `start_number`: Primo numero della sequenza (default: 1)
//! - `rename_by_date`: Rinomina per data di scatto (default: false)
//! - `compress`: Abilita la compressione (default: false)
//! - `compression.quality`: Qualità JPEG/WebP (1-100, default: 85)
//! - `compression.max_width` / `max_height`: Box massimo (default: 1920x1080)
//! - `compression.output_dir`: Directory di output (default: None = sovrascrive)
//! - `json_output`: Eventi JSON su stdout al posto dei log (default: false)
//! - `show_progress`: Barra di progresso interattiva (default: true)
//!
//! ## Validazione:
//! - Controlla che la qualità sia 1-100
//! - Controlla che le dimensioni massime siano > 0
//! - Controlla che il pattern non sia vuoto e non contenga separatori di path
//! - Rinomina per pattern e per data sono alternative
//! - Almeno un'operazione deve essere selezionata
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     compress: true,
//!     compression: CompressionParams { quality: 70, ..Default::default() },
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ProcessError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters of the compress operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionParams {
    /// Encoder quality (1-100). 100 keeps PNG sources lossless.
    pub quality: u8,
    /// Longest allowed width in pixels
    pub max_width: u32,
    /// Longest allowed height in pixels
    pub max_height: u32,
    /// Output directory (None = overwrite in place)
    pub output_dir: Option<PathBuf>,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            quality: 85,
            max_width: 1920,
            max_height: 1080,
            output_dir: None,
        }
    }
}

impl CompressionParams {
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ProcessError::Validation("quality must be between 1 and 100".to_string()).into());
        }

        if self.max_width == 0 || self.max_height == 0 {
            return Err(ProcessError::Validation("max width and max height must be greater than 0".to_string()).into());
        }

        if let Some(ref output_dir) = self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(ProcessError::Validation(
                    format!("output path is not a directory: {}", output_dir.display())
                ).into());
            }
        }

        Ok(())
    }

    /// A PNG source is converted to JPEG unless the full quality is requested
    pub fn wants_lossy_png(&self) -> bool {
        self.quality < 100
    }
}

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Prefix for sequential renaming (None = no pattern rename)
    pub rename_pattern: Option<String>,
    /// First sequence number
    pub start_number: u64,
    /// Rename by capture date instead of pattern
    pub rename_by_date: bool,
    /// Run the compress operation after renaming
    pub compress: bool,
    /// Compress parameters
    pub compression: CompressionParams,
    /// Output progress and results as JSON lines for a GUI wrapper
    pub json_output: bool,
    /// Draw a progress bar while processing
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rename_pattern: None,
            start_number: 1,
            rename_by_date: false,
            compress: false,
            compression: CompressionParams::default(),
            json_output: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(ref pattern) = self.rename_pattern {
            if pattern.is_empty() {
                return Err(ProcessError::Validation("rename pattern must not be empty".to_string()).into());
            }
            if pattern.contains('/') || pattern.contains('\\') {
                return Err(ProcessError::Validation(
                    format!("rename pattern must not contain path separators: {}", pattern)
                ).into());
            }
            if self.rename_by_date {
                return Err(ProcessError::Validation(
                    "choose either a rename pattern or rename by date, not both".to_string()
                ).into());
            }
        }

        if !self.has_operation() {
            return Err(ProcessError::Validation(
                "no operation selected (use --rename, --rename-by-date or --compress)".to_string()
            ).into());
        }

        if self.compress {
            self.compression.validate()?;
        }

        Ok(())
    }

    /// Whether at least one operation is selected
    pub fn has_operation(&self) -> bool {
        self.rename_pattern.is_some() || self.rename_by_date || self.compress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compress_config() -> Config {
        Config {
            compress: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = compress_config();
        assert!(config.validate().is_ok());

        config.compression.quality = 0;
        assert!(config.validate().is_err());

        config.compression.quality = 101;
        assert!(config.validate().is_err());

        config.compression.quality = 85;
        config.compression.max_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.start_number, 1);
        assert_eq!(config.compression.quality, 85);
        assert_eq!(config.compression.max_width, 1920);
        assert_eq!(config.compression.max_height, 1080);
        assert!(config.compression.output_dir.is_none());
        assert!(!config.rename_by_date);
        assert!(!config.compress);
    }

    #[test]
    fn test_no_operation_rejected() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_pattern_rules() {
        let mut config = Config {
            rename_pattern: Some("image_".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.rename_pattern = Some(String::new());
        assert!(config.validate().is_err());

        config.rename_pattern = Some("../image_".to_string());
        assert!(config.validate().is_err());

        config.rename_pattern = Some("image_".to_string());
        config.rename_by_date = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_dir_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_dir.txt");
        std::fs::write(&file_path, b"x").unwrap();

        let mut config = compress_config();
        config.compression.output_dir = Some(file_path);
        assert!(config.validate().is_err());

        // a missing directory is fine, it is created on demand
        config.compression.output_dir = Some(temp_dir.path().join("out"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lossy_png_threshold() {
        let mut params = CompressionParams::default();
        assert!(params.wants_lossy_png());
        params.quality = 100;
        assert!(!params.wants_lossy_png());
    }
}
