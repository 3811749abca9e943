mod commands;
mod input;
mod render;

use clap::{Parser, Subcommand};
use commands::{convert::ConvertArgs, record::RecordArgs, show::ShowArgs};
use lyricsync_core::{CoreError, LyricSyncConfig};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyricsync", version, about = "Tap-along lyric sync and subtitle preview")]
struct Cli {
    /// Config file (defaults to ~/.config/lyricsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record timing by tapping along on stdin
    Record(RecordArgs),
    /// Preview which line is visible over time
    Show(ShowArgs),
    /// Convert a track between SRT, LRC and JSON
    Convert(ConvertArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref());
    let file_logging = loaded.as_ref().is_ok_and(|config| config.logging.enabled);
    init_tracing(file_logging);

    let config = match loaded {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!("Created config template at {}, using defaults", path.display());
            LyricSyncConfig::default()
        }
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Record(args) => commands::record::run(args, &config).await,
        Command::Show(args) => commands::show::run(args, &config).await,
        Command::Convert(args) => commands::convert::run(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> lyricsync_core::Result<LyricSyncConfig> {
    match path {
        Some(path) => LyricSyncConfig::load_from(path),
        None => LyricSyncConfig::load_or_create(),
    }
}

fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = lyricsync_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
