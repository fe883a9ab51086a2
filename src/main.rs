mod app;
mod command;
mod config;
mod error;
mod event;
mod input;
mod poll;
mod portal;
mod theme;
mod ui;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

use crate::{app::AppState, event::run, portal::PortalClient};

/// A lightweight, keyboard-driven TUI for the WiFi portal of squeezelite ESP32 devices
#[derive(Parser, Debug)]
#[command(
    name = "portalui",
    about = "A lightweight, keyboard-driven TUI for the WiFi configuration portal of squeezelite ESP32 devices.",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    disable_version_flag = true
)]
struct Args {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Base URL of the device portal
    #[arg(short, long, default_value = config::DEFAULT_PORTAL_URL)]
    url: String,

    /// HTTP request timeout in milliseconds
    #[arg(long, default_value_t = config::REQUEST_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Interval between connection status polls in milliseconds
    #[arg(long, default_value_t = config::STATUS_POLL_INTERVAL_MS)]
    status_interval_ms: u64,

    /// Interval between access point list refreshes in milliseconds
    #[arg(long, default_value_t = config::AP_REFRESH_INTERVAL_MS)]
    scan_interval_ms: u64,

    /// Use ASCII icons (no Nerd Fonts required)
    #[arg(long)]
    ascii: bool,

    /// Show key logger for debugging
    #[arg(long = "show-keys")]
    show_keys: bool,

    /// Append logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// The terminal belongs to the UI, so logs only ever go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let client = PortalClient::new(&args.url, Duration::from_millis(args.timeout_ms))?;
    let mut state = AppState::new(
        Duration::from_millis(args.status_interval_ms),
        Duration::from_millis(args.scan_interval_ms),
        args.show_keys,
        args.ascii,
    );

    let terminal = ratatui::init();
    enable_raw_mode()?;
    let result = run(terminal, &mut state, client).await;
    disable_raw_mode()?;

    ratatui::restore();
    result
}
