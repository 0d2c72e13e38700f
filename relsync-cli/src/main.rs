//! relsync: keep a release sheet in step with the Sfera tracker.
//!
//! # Usage
//!
//! ```text
//! relsync init
//! relsync sync [<release>] [--no-append] [--no-update] [--dry-run] [--tasks-json <path>]
//! relsync diff [<release>] [--json] [--tasks-json <path>]
//! ```
//!
//! Global flags: `--config <path>` (default `~/.relsync/config.yaml`) and
//! `--log-file <path>`.

mod commands;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "relsync",
    version,
    about = "Sync Sfera release tasks into a Google Sheets release sheet",
    long_about = None,
)]
struct Cli {
    /// Config file to use instead of ~/.relsync/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write log output to this file (appended).
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config skeleton unless one already exists.
    Init(InitArgs),

    /// Append missing tasks and rewrite changed statuses.
    Sync(SyncArgs),

    /// Show what sync would append and update, without writing.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Init(args) => args.run(config),
        Commands::Sync(args) => args.run(config),
        Commands::Diff(args) => args.run(config),
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory '{}'", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}
