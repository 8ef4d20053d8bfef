//! Binary crate for the `weather-crawler` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging to stderr and a log file
//! - Interactive credential configuration

use std::{fs::OpenOptions, path::Path, process::ExitCode, sync::Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cmd = cli::Cli::parse();

    if let Err(err) = init_tracing(&cmd.log_file) {
        eprintln!("weather-crawler: {err:#}");
        return ExitCode::FAILURE;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "weather crawler starting");
    match cmd.run().await {
        Ok(()) => {
            tracing::info!("weather crawler finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("weather crawler aborted: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_file: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
