//! Paircast CLI — Side-by-side video composition and recording.
//!
//! Usage:
//!   paircast compose <LEFT> <RIGHT> [OPTIONS]   Compose and record two videos
//!   paircast probe <PATH>                       Show a video's decoded dimensions
//!   paircast check                              Check GStreamer element availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "paircast",
    about = "Compose two videos side by side and record the result as WebM",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play two videos side by side and record the composite
    Compose {
        /// Left video file
        left: PathBuf,

        /// Right video file
        right: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "movie.webm")]
        output: PathBuf,

        /// Composite frame rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Recording duration in seconds (default: until Ctrl+C)
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Show a video file's decoded dimensions
    Probe {
        /// Path to the video file
        path: PathBuf,
    },

    /// Check GStreamer element availability
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    paircast_common::logging::init_logging(&paircast_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Compose {
            left,
            right,
            output,
            fps,
            duration,
        } => commands::compose::run(left, right, output, fps, duration).await,
        Commands::Probe { path } => commands::probe::run(path).await,
        Commands::Check => commands::check::run(),
    }
}
