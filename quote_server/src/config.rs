//! Command-line / environment configuration of the quote server.
//!
//! Every option can be passed as a flag or through its environment variable; flags win.
use clap::{Parser, ValueEnum};
use log::info;
use quote_common::net::{DEFAULT_HOST, DEFAULT_PORT, addr};
use quote_common::{QuoteError, Result};
use std::time::Duration;
use strum::{Display, EnumString};

use crate::resolver::ResolverSettings;
use crate::source::http::SYMBOL_PLACEHOLDER;

/// Quote providers the server can be started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    /// Offline random-walk prices.
    Simulated,
    /// JSON endpoint described by `--source-url`.
    Http,
}

/// Parsed server options.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Rate-limited, cached quote service", long_about = None)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "SCRAPER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "SCRAPER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// A cached quote younger than this is served without fetching.
    #[arg(long, env = "CACHE_TTL_MS", default_value_t = 30_000)]
    pub cache_ttl_ms: u64,

    /// Minimum spacing between two calls to the quote source.
    #[arg(long, env = "MIN_FETCH_INTERVAL_MS", default_value_t = 5_000)]
    pub min_fetch_interval_ms: u64,

    /// Bound on a single call to the quote source.
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value_t = 15_000)]
    pub timeout_ms: u64,

    /// Quote provider.
    #[arg(long, env = "QUOTE_PROVIDER", value_enum, default_value_t = Provider::Simulated)]
    pub provider: Provider,

    /// URL template of the http provider, with a `{symbol}` placeholder.
    #[arg(long, env = "QUOTE_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Probability that a simulated fetch fails.
    #[arg(long, env = "SIMULATED_FAILURE_RATE", default_value_t = 0.0)]
    pub simulated_failure_rate: f64,
}

impl ServerConfig {
    /// Reject combinations clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.provider == Provider::Http {
            match &self.source_url {
                None => {
                    return Err(QuoteError::Format(
                        "--source-url is required with --provider http".to_string(),
                    ));
                }
                Some(url) if !url.contains(SYMBOL_PLACEHOLDER) => {
                    return Err(QuoteError::Format(format!(
                        "--source-url must contain {}",
                        SYMBOL_PLACEHOLDER
                    )));
                }
                Some(_) => {}
            }
        }
        if !(0.0..=1.0).contains(&self.simulated_failure_rate) {
            return Err(QuoteError::Format(
                "--simulated-failure-rate must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        addr(&self.host, self.port)
    }

    /// Resolver tunables derived from the options.
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
            min_fetch_interval: Duration::from_millis(self.min_fetch_interval_ms),
            fetch_timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        info!("Quote provider: {}", self.provider);
        if let Some(url) = &self.source_url {
            info!("Source URL: {}", url);
        }
        info!("Cache TTL: {}ms", self.cache_ttl_ms);
        info!("Min fetch interval: {}ms", self.min_fetch_interval_ms);
        info!("Fetch timeout: {}ms", self.timeout_ms);
    }
}
