#![deny(unsafe_code)]

mod common;
mod config;
mod constants;
mod overlay;
mod settings;
mod stats;
mod x11;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Namespace;

#[derive(Parser)]
#[command(name = "sysmon-overlay")]
#[command(version)]
#[command(about = "Always-on-top CPU and memory overlay", long_about = None)]
struct Cli {
    /// Run the settings editor instead of the overlay
    #[arg(long)]
    settings: bool,

    /// Name of the IPC server to report back to (set by the overlay)
    #[arg(long)]
    ipc_server: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let cli = Cli::parse();
    let store_path = cli.config.unwrap_or_else(|| Namespace::default().path());

    if cli.settings {
        settings::run_settings(store_path, cli.ipc_server)
    } else {
        common::debug::log_system_info();
        overlay::run_overlay(store_path)
    }
}
