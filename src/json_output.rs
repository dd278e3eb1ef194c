//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per un front-end grafico.
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout per ogni evento della run
//! - Riusa `FileOutcome` e `BatchReport` così il front-end riceve gli stessi dati dei log
//! - Il front-end mostra le righe di log e il riepilogo, senza stato condiviso con il motore
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio di un'operazione
//! - `file_complete`: Fine elaborazione di un file (esito + riga di log)
//! - `operation_complete`: Fine di un'operazione con i conteggi
//! - `error`: Errore fatale prima o durante la run

use crate::report::{BatchReport, FileOutcome, Operation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Start of one operation
    #[serde(rename = "start")]
    Start {
        operation: Operation,
        directory: PathBuf,
        total_files: usize,
    },

    /// One file handled
    #[serde(rename = "file_complete")]
    FileComplete {
        index: usize,
        total: usize,
        outcome: FileOutcome,
        log_line: String,
    },

    /// Operation finished
    #[serde(rename = "operation_complete")]
    OperationComplete {
        operation: Operation,
        succeeded: usize,
        skipped: usize,
        failed: usize,
        bytes_saved: u64,
        summary: String,
    },

    /// Fatal error
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(operation: Operation, directory: PathBuf, total_files: usize) -> Self {
        Self::Start {
            operation,
            directory,
            total_files,
        }
    }

    pub fn file_complete(index: usize, total: usize, outcome: &FileOutcome) -> Self {
        Self::FileComplete {
            index,
            total,
            outcome: outcome.clone(),
            log_line: outcome.to_string(),
        }
    }

    pub fn operation_complete(report: &BatchReport) -> Self {
        Self::OperationComplete {
            operation: report.operation,
            succeeded: report.succeeded(),
            skipped: report.skipped(),
            failed: report.failed(),
            bytes_saved: report.bytes_saved(),
            summary: report.format_summary(),
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}
