//! # Processor Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `batch_processor`: Orchestratore principale di una run
//! - `progress_tracker`: Gestione progress unificata (barra, JSON, log)
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch_processor;
pub mod path_resolver;
pub mod progress_tracker;

pub use batch_processor::{BatchProcessor, RunSummary};
pub use path_resolver::PathResolver;
pub use progress_tracker::{OutputMode, ProgressTracker};
