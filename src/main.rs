//! # Image Batch - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione della directory prima di toccare qualsiasi file
//! - Creazione della configurazione e avvio del BatchProcessor
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, pattern, quality, dimensioni, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che la directory esista
//! 4. Crea un oggetto Config con tutti i parametri
//! 5. Istanzia BatchProcessor ed esegue rinomina e compressione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-batch /path/to/photos --rename-by-date --compress --quality 80
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use image_batch::{json_output::JsonMessage, BatchProcessor, CompressionParams, Config};

#[derive(Parser)]
#[command(name = "image-batch")]
#[command(about = "Batch rename and compress the images of a directory")]
struct Args {
    /// Directory containing the images
    directory: PathBuf,

    /// Rename pattern, e.g. "image_" gives image_1.jpg, image_2.jpg, ...
    #[arg(short, long, conflicts_with = "rename_by_date")]
    rename: Option<String>,

    /// First number of the rename sequence
    #[arg(short, long, default_value = "1")]
    start_number: u64,

    /// Rename after the capture date (YYYYMMDD_HHMMSS)
    #[arg(short = 'd', long)]
    rename_by_date: bool,

    /// Compress the images
    #[arg(short, long)]
    compress: bool,

    /// Encoder quality (1-100); 100 keeps PNG lossless
    #[arg(short, long, default_value = "85")]
    quality: u8,

    /// Maximum width
    #[arg(long, default_value = "1920")]
    max_width: u32,

    /// Maximum height
    #[arg(long, default_value = "1080")]
    max_height: u32,

    /// Output directory for compressed images (if not specified, replace originals in place)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Emit JSON lines on stdout for a GUI front-end
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; JSON mode keeps stdout for events
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.directory.is_dir() {
        let message = format!("Directory does not exist: {}", args.directory.display());
        if args.json {
            JsonMessage::error(message.clone(), None).emit();
        }
        return Err(anyhow::anyhow!(message));
    }

    let config = Config {
        rename_pattern: args.rename,
        start_number: args.start_number,
        rename_by_date: args.rename_by_date,
        compress: args.compress,
        compression: CompressionParams {
            quality: args.quality,
            max_width: args.max_width,
            max_height: args.max_height,
            output_dir: args.output_dir,
        },
        json_output: args.json,
        show_progress: !args.json,
    };

    let json = config.json_output;
    let result = match BatchProcessor::new(config) {
        Ok(mut processor) => processor.run(&args.directory).await,
        Err(e) => Err(e),
    };

    if let Err(ref e) = result {
        if json {
            JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
        }
    }

    result.map(|_| ())
}
