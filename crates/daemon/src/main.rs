//! Instadesk State Host
//!
//! Long-running process that owns the layout manager's session state.
//!
//! Responsibilities:
//! - Maintain grid selection, assignments and clipboard
//! - Keep favorites and application history in durable storage
//! - Answer UI commands over line-delimited JSON on stdin/stdout
//!
//! Logs go to stderr so stdout carries protocol responses only.

mod config;
mod picker;
mod server;
mod state;

use anyhow::Result;
use clap::Parser;
use config::{parse_log_level, Config};
use instadesk_storage::{BackendPreference, KeyValueStore};
use picker::picker_from_config;
use state::AppState;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "instadesk")]
#[command(author, version, about = "Instadesk layout manager state host")]
struct Args {
    /// Configuration file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep favorites and history in memory only
    #[arg(long)]
    in_memory: bool,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Config {
    let loaded = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        // Can't use tracing yet, fall back to eprintln
        eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
        Config::default()
    });

    if args.in_memory {
        config.storage.backend = BackendPreference::Memory;
    }
    if let Some(level) = &args.log_level {
        config.behavior.log_level = level.clone();
    }
    config
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args);
    let config_warnings = config.validate();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&config.behavior.log_level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    for w in &config_warnings {
        warn!("Config: {} - {}", w.field, w.message);
    }

    info!("Instadesk starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: grid={}x{}, storage={:?}, key_prefix={}, log_level={}",
        config.grid.rows,
        config.grid.cols,
        config.storage.backend,
        config.storage.key_prefix,
        config.behavior.log_level
    );

    let store = KeyValueStore::open(config.storage.backend, config.storage.data_dir.clone());
    let picker = picker_from_config(&config.picker);
    let mut state = AppState::new_with_config(&config, store, picker);
    info!(
        "Session ready: {} cells, {} favorites, {} history entries",
        state.engine().size().cell_count(),
        state.favorites().len(),
        state.history().len()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        server::run(&mut state, stdin, stdout).await
    });
    // A blocking stdin read may still be in flight after `stop`.
    runtime.shutdown_background();

    info!("Instadesk stopped");
    result
}
