//! Command-line arguments for the Quote Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::{Args as ClapArgs, Parser, Subcommand};
use quote_common::net::default_base_url;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the quote service.
    #[arg(long, env = "QUOTE_SERVER_URL", default_value_t = default_base_url())]
    pub server_url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// What to ask the service.
    #[command(subcommand)]
    pub command: Command,
}

/// Client actions.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch quotes once, or repeatedly with `--refresh-secs`.
    Quotes(QuotesArgs),
    /// Print the service's cache status.
    Health,
}

/// Options of the `quotes` command.
#[derive(Debug, ClapArgs)]
pub struct QuotesArgs {
    /// Comma separated symbols, e.g. `AAPL,MSFT,TSLA`.
    #[arg(long, conflicts_with = "path")]
    pub symbols: Option<String>,

    /// Path to a text file with symbols.
    /// Symbols may be separated by commas, spaces, or new lines.
    #[arg(long)]
    pub path: Option<String>,

    /// Poll every N seconds (at least 5) until Ctrl+C.
    #[arg(long)]
    pub refresh_secs: Option<u64>,
}
