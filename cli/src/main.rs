//! PTAX command-line client.
//!
//! Resolves the latest official BRL exchange rates and prints JSON to stdout.
//! Logs go to stderr as JSON, filtered by `RUST_LOG`.

mod cli;
mod commands;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptax_fx::{PtaxConfig, PtaxEngine};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = PtaxConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(base_url = %config.base_url, "Using PTAX feed");

    let engine = match PtaxEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Failed to create feed client");
            return Err(e.into());
        }
    };

    let output = match commands::run(&cli, &engine).await {
        Ok(output) => output,
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Command failed");
            return Err(e.into());
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
