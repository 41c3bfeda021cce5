// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf - step a counter rule engine from JSON-lines input

mod config;
mod counter;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use rf_core::LoggingConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::RunnerConfig;
use crate::counter::Counter;

#[derive(Parser)]
#[command(
    name = "rf",
    version,
    about = "rf steps a counter rule engine, one JSON line of events per step"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial context as JSON, e.g. '{"count": 5}'
    #[arg(long)]
    initial: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    setup_logging(&config.engine.logging)?;

    let initial = match &cli.initial {
        Some(json) => serde_json::from_str::<Counter>(json).context("invalid --initial")?,
        None => Counter::default(),
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run::run(&config, initial, stdin.lock(), stdout.lock(), std::io::stderr()).await?;
    Ok(())
}

/// Logs go to stderr so stdout carries only step results
fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("invalid log filter '{}'", config.filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .try_init()?;
    Ok(())
}
