//! Chaos fleet service binary.
//!
//! Runs one of three cooperating services, selected on the command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────┐        GET /history/{id}       ┌──────────────────────┐
//!   │       platform       │───────────────────────────────▶│        rental        │
//!   │                      │                                │  chaos middleware    │
//!   │  scheduler (poller)  │        GET /vehicles/{id}      ├──────────────────────┤
//!   │  /config/scheduler   │───────────────────────────────▶│       vehicles       │
//!   └──────────────────────┘                                │  chaos middleware    │
//!                                                           └──────────────────────┘
//!
//!   Cross-cutting: config (file + env + hot reload), logging, metrics, request IDs,
//!   graceful shutdown
//! ```

use std::path::PathBuf;

use clap::Parser;

use chaos_fleet::config::ServiceKind;
use chaos_fleet::lifecycle::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "chaos-fleet")]
#[command(about = "Platform, rental and vehicles services with chaos injection", long_about = None)]
struct Cli {
    /// Which service to run
    #[arg(value_enum)]
    service: ServiceKind,

    /// Path to a TOML configuration file (watched for changes)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    lifecycle::run(StartupOptions {
        kind: cli.service,
        config_path: cli.config,
    })
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
