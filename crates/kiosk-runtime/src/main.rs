//! # notouch-kiosk
//!
//! ```text
//! notouch-kiosk [--config FILE] [--simulate]
//! ```
//!
//! Logging is configured from the environment (`RUST_LOG`,
//! `KIOSK_LOG_LEVEL`, `KIOSK_JSON_LOGS`), everything else from
//! `KioskConfig`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kiosk_runtime::{KioskConfig, KioskRuntime};
use kiosk_telemetry::{init_logging, register_metrics, TelemetryConfig};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "notouch-kiosk")]
#[command(author, version, about = "Access control for an unattended waste-disposal kiosk", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run with simulated devices and an in-process event bus
    #[arg(long)]
    simulate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&TelemetryConfig::from_env())?;
    register_metrics()?;

    let mut config =
        KioskConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if args.simulate {
        config.hardware.simulate = true;
    }

    let runtime = KioskRuntime::new(config).context("Failed to wire the kiosk")?;
    runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Cannot listen for Ctrl-C, stopping");
            }
        })
        .await?;

    Ok(())
}
