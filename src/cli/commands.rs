//! CLI commands implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{load_settings, resolve_tool, Settings};
use crate::server;
use crate::services::{sweep, DeckService};

#[derive(Parser)]
#[command(name = "deckscribe")]
#[command(about = "Slide deck upload, rasterization, and per-slide commentary service")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Listen host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert one deck to slide images without starting the server
    Convert {
        /// Path to a .pptx or .pdf file
        file: PathBuf,
    },

    /// Check external tool availability
    Doctor,

    /// Run the retention sweep once
    Sweep {
        /// Remove artifacts older than this many days
        #[arg(short, long, default_value = "14")]
        days: u64,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            server::serve(settings).await
        }
        Commands::Convert { file } => convert_file(&settings, &file).await,
        Commands::Doctor => doctor(&settings),
        Commands::Sweep { days } => {
            settings.ensure_dirs()?;
            let report = sweep(&settings, Duration::from_secs(days * 24 * 60 * 60))?;
            println!(
                "Removed {} artifacts ({} uploads, {} slide dirs, {} commentary, {} audio)",
                report.total(),
                report.uploads_removed,
                report.slide_dirs_removed,
                report.commentary_removed,
                report.audio_removed,
            );
            Ok(())
        }
    }
}

async fn convert_file(settings: &Settings, file: &PathBuf) -> anyhow::Result<()> {
    settings.ensure_dirs()?;
    let service = DeckService::new(settings);
    service.verify_tools()?;

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("not a file: {}", file.display()))?;
    let bytes = std::fs::read(file)?;

    let processed = service.process(filename, &bytes).await?;
    println!(
        "{} deck {} ({} slides)",
        style("Converted").green().bold(),
        processed.deck_id,
        processed.slides.len()
    );
    for slide in &processed.slides {
        println!("  {}", settings.slides_dir().join(&slide.rel_path).display());
    }
    Ok(())
}

fn doctor(settings: &Settings) -> anyhow::Result<()> {
    let mut all_ok = true;
    for (name, configured) in [
        ("soffice", &settings.soffice_path),
        ("pdftoppm", &settings.pdftoppm_path),
    ] {
        match resolve_tool(configured) {
            Some(path) => println!(
                "{} {} at {}",
                style("ok").green().bold(),
                name,
                path.display()
            ),
            None => {
                all_ok = false;
                println!(
                    "{} {} not found (configured as {:?})",
                    style("missing").red().bold(),
                    name,
                    configured
                );
            }
        }
    }
    if !all_ok {
        anyhow::bail!("one or more external tools are missing");
    }
    Ok(())
}
