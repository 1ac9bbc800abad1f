//! Command-line arguments for the `ptax` binary.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ptax_fx::{RateKind, ResolveOptions};
use rust_decimal::Decimal;
use std::time::Duration;

/// Official BRL exchange rates (PTAX) from the Banco Central do Brasil.
///
/// Configuration is read from PTAX_* environment variables; the flags below
/// override it for a single invocation.
#[derive(Debug, Parser)]
#[command(name = "ptax", version, about = "Official BRL exchange rates (PTAX)")]
pub struct Cli {
    /// Calendar days to look back, including the start date.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply flag overrides on top of configured defaults.
    pub fn resolve_options(&self, defaults: ResolveOptions) -> ResolveOptions {
        let mut options = defaults;
        if let Some(max_retries) = self.max_retries {
            options.max_retries = max_retries;
        }
        if let Some(ms) = self.timeout_ms {
            options.timeout = Duration::from_millis(ms);
        }
        options
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the full rate set for a date (default: latest).
    Rates(RatesArgs),
    /// Print the latest quote for one currency.
    Rate(RateArgs),
    /// List currencies in the latest rate set.
    Currencies,
    /// Convert an amount between two currencies.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct RatesArgs {
    /// Start date (YYYY-MM-DD); earlier days are tried when it has no data.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct RateArgs {
    /// Currency code, e.g. USD.
    pub currency: String,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Amount to convert.
    pub amount: Decimal,
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Side of the spread to use (buy or sell).
    #[arg(long, default_value = "sell")]
    pub rate_kind: RateKind,
}
