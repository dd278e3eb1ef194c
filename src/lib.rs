//! # Image Batch Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per un front-end grafico
//!
//! ## Architettura dei moduli:
//! - `config`: Parametri della run e validazione
//! - `error`: Tipi di errore custom
//! - `file_manager`: Discovery delle immagini e utilità sui file
//! - `capture_date`: Data di scatto da EXIF o da modification time
//! - `renamer`: Rinomina per pattern e per data di scatto
//! - `image_processor`: Compressione (resize + ricodifica)
//! - `report`: Esiti per file e report per operazione
//! - `processor`: Orchestratore, progress tracking e calcolo path
//! - `progress`: Progress bar e statistiche aggregate
//! - `json_output`: Eventi JSON per un front-end
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_batch::{BatchProcessor, Config};
//!
//! let config = Config { rename_by_date: true, compress: true, ..Default::default() };
//! let mut processor = BatchProcessor::new(config)?;
//! let summary = processor.run(&path).await?;
//! ```

pub mod capture_date;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod processor;
pub mod progress;
pub mod renamer;
pub mod report;

pub use config::{CompressionParams, Config};
pub use error::ProcessError;
pub use file_manager::{FileManager, ImageFile};
pub use image_processor::ImageProcessor;
pub use processor::{BatchProcessor, ProgressTracker, RunSummary};
pub use renamer::Renamer;
pub use report::{BatchReport, FileOutcome, Operation, SkipReason};
