//! Quote server binary.
//!
//! Wires the configured quote source into the resolver, the resolver into the batch
//! resolver, and serves the result over HTTP until Ctrl+C.
//!
//! The blocking parts (the HTTP provider's client in particular) are built before the
//! async runtime starts and dropped after it stopped.
use clap::Parser;
use log::{error, info};
use quote_common::{QuoteError, Result};
use quote_server::api::{AppState, serve};
use quote_server::config::{Provider, ServerConfig};
use quote_server::source::{HttpQuoteSource, QuoteSource, SimulatedSource};
use quote_server::{BatchResolver, QuoteResolver};
use std::sync::Arc;

fn build_source(config: &ServerConfig) -> Result<Arc<dyn QuoteSource>> {
    match config.provider {
        Provider::Simulated => Ok(Arc::new(SimulatedSource::with_failure_rate(
            config.simulated_failure_rate,
        ))),
        Provider::Http => {
            let url = config.source_url.as_deref().ok_or_else(|| {
                QuoteError::Format("--source-url is required with --provider http".to_string())
            })?;
            Ok(Arc::new(HttpQuoteSource::new(url)?))
        }
    }
}

fn main() -> Result<(), QuoteError> {
    init_logger();
    let config = ServerConfig::parse();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e);
    }
    config.log_summary();

    let source = build_source(&config)?;
    let resolver = Arc::new(QuoteResolver::new(source, config.resolver_settings()));
    let batch = Arc::new(BatchResolver::new(resolver));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(&config.bind_addr(), AppState::new(Arc::clone(&batch))))?;
    drop(runtime);

    info!(
        "Quote server stopped with {} cached symbols",
        batch.resolver().cache().len()
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
