//! Quote Client — queries a quote service over HTTP and prints the answers.
//!
//! It reads the symbols from the command line or from a text file, asks the service for
//! their quotes once or on a fixed refresh interval, and can print the service's cache
//! status.
//!
//! Usage example (CLI):
//! ```bash
//! quote_client --server-url http://localhost:9000 quotes --path ./tickers.txt --refresh-secs 60
//! quote_client health
//! ```
//!
//! The symbol file should contain symbols separated by commas, spaces, or new lines.
#![warn(missing_docs)]
mod args;
mod sender;

use crate::args::{Args, Command, QuotesArgs};
use crate::sender::QuoteFetcher;
use chrono::Local;
use clap::Parser;
use crossbeam_channel::{bounded, select, tick};
use log::{error, info, warn};
use quote_common::symbols::{SymbolParser, parse_csv};
use quote_common::{QuoteError, QuoteRecord, Result, Symbol};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

/// Shortest refresh interval accepted; the service itself rate-limits its source.
const MIN_REFRESH_SECS: u64 = 5;

fn print_quote(quote: &QuoteRecord) {
    info!(
        "QUOTE: {} Price={:.2} Change={:+.2} ({:+.2}%) Time={}",
        quote.symbol,
        quote.price,
        quote.change,
        quote.percent,
        quote.timestamp.with_timezone(&Local).format("%H:%M:%S")
    );
}

fn fetch_and_print(fetcher: &QuoteFetcher, symbols: &[Symbol]) -> Result<()> {
    let quotes = fetcher.fetch_quotes(symbols)?;
    if quotes.len() < symbols.len() {
        warn!("{} of {} symbols returned", quotes.len(), symbols.len());
    }
    quotes.iter().for_each(print_quote);
    Ok(())
}

/// Polls the service every `interval` until Ctrl+C. A failed poll is logged and the
/// loop keeps going.
fn start_refresh_loop(
    fetcher: &QuoteFetcher,
    symbols: &[Symbol],
    interval: Duration,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down client...");
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    info!(
        "Refreshing every {}s. Press Ctrl+C to exit.",
        interval.as_secs()
    );
    let ticker = tick(interval);
    loop {
        if let Err(e) = fetch_and_print(fetcher, symbols) {
            error!("Refresh failed: {}", e);
        }
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(ticker) -> _ => {},
        }
    }
    info!("Refresh loop stopping...");
    Ok(())
}

fn load_symbols(args: &QuotesArgs) -> Result<Vec<Symbol>> {
    let symbols = match (&args.symbols, &args.path) {
        (Some(csv), _) => parse_csv(csv),
        (None, Some(path)) => {
            let file_path = normalize_path(path);
            if !is_file_exist(&file_path) {
                return Err(QuoteError::ParseSymbolsFile(format!(
                    "file not found: {}",
                    file_path.display()
                )));
            }
            let file = File::open(file_path)?;
            Symbol::parse_from_file(BufReader::new(file))?
        }
        (None, None) => {
            return Err(QuoteError::Format(
                "either --symbols or --path is required".to_string(),
            ));
        }
    };
    if symbols.is_empty() {
        return Err(QuoteError::NoSymbolsProvided);
    }
    Ok(symbols)
}

fn run_quotes(fetcher: &QuoteFetcher, args: &QuotesArgs) -> Result<()> {
    let symbols = load_symbols(args)?;
    info!(
        "Symbols: {}",
        symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    match args.refresh_secs {
        Some(secs) => {
            let secs = if secs < MIN_REFRESH_SECS {
                warn!(
                    "--refresh-secs={} is below the minimum, using {}",
                    secs, MIN_REFRESH_SECS
                );
                MIN_REFRESH_SECS
            } else {
                secs
            };
            start_refresh_loop(fetcher, &symbols, Duration::from_secs(secs))
        }
        None => fetch_and_print(fetcher, &symbols),
    }
}

fn run_health(fetcher: &QuoteFetcher) -> Result<()> {
    let report = fetcher.fetch_health()?;
    info!(
        "Service status: {} ({} cached symbols)",
        report.status, report.cached_symbols
    );
    for entry in &report.cache {
        info!("  {} age={}ms", entry.symbol, entry.age);
    }
    Ok(())
}

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();
    let server_url = args.server_url.trim().replace('"', "");
    let fetcher = QuoteFetcher::new(&server_url, Duration::from_secs(args.timeout_secs))?;
    info!("Quote service: {}", server_url);

    let result = match &args.command {
        Command::Quotes(quotes_args) => run_quotes(&fetcher, quotes_args),
        Command::Health => run_health(&fetcher),
    };
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_paths_are_unwrapped() {
        assert_eq!(normalize_path("  \"C:\\tickers.txt\" "), PathBuf::from("C:\\tickers.txt"));
        assert_eq!(normalize_path("./tickers.txt"), PathBuf::from("./tickers.txt"));
    }

    #[test]
    fn symbols_come_from_the_command_line() {
        let args = QuotesArgs {
            symbols: Some("aapl, msft,,".to_string()),
            path: None,
            refresh_secs: None,
        };
        let symbols = load_symbols(&args).unwrap();
        let expected = vec![
            Symbol::normalize("AAPL").unwrap(),
            Symbol::normalize("MSFT").unwrap(),
        ];
        assert_eq!(symbols, expected);
    }

    #[test]
    fn blank_symbols_are_rejected() {
        let args = QuotesArgs {
            symbols: Some(" , ".to_string()),
            path: None,
            refresh_secs: None,
        };
        assert!(matches!(load_symbols(&args), Err(QuoteError::NoSymbolsProvided)));
    }

    #[test]
    fn missing_file_is_reported() {
        let args = QuotesArgs {
            symbols: None,
            path: Some("/definitely/not/here.txt".to_string()),
            refresh_secs: None,
        };
        assert!(matches!(load_symbols(&args), Err(QuoteError::ParseSymbolsFile(_))));
    }
}
