//! JSON-over-HTTP quote source.
//!
//! The provider is configured with a URL template containing a `{symbol}` placeholder,
//! e.g. `http://localhost:7000/price/{symbol}`. The endpoint must answer with a JSON
//! object of the shape `{"price": 123.4, "change": 1.2, "percent": 0.98}` where only
//! `price` is required.

use log::debug;
use quote_common::{QuoteError, RawQuote, Result, Symbol};
use reqwest::blocking::Client;
use std::time::Duration;

use super::QuoteSource;

/// Placeholder replaced by the symbol in the URL template.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

const USER_AGENT: &str = concat!("quote_server/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP quote provider.
#[derive(Debug)]
pub struct HttpQuoteSource {
    client: Client,
    url_template: String,
}

impl HttpQuoteSource {
    /// Build a source for `url_template`, which must contain `{symbol}`.
    pub fn new(url_template: &str) -> Result<Self> {
        if !url_template.contains(SYMBOL_PLACEHOLDER) {
            return Err(QuoteError::Format(format!(
                "source URL must contain {}: {}",
                SYMBOL_PLACEHOLDER, url_template
            )));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| QuoteError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    /// URL queried for `symbol`.
    pub fn url_for(&self, symbol: &Symbol) -> String {
        self.url_template
            .replace(SYMBOL_PLACEHOLDER, symbol.as_str())
    }

    fn classify(symbol: &Symbol, timeout: Duration, err: reqwest::Error) -> QuoteError {
        if err.is_timeout() {
            QuoteError::SourceTimeout {
                symbol: symbol.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            QuoteError::SourceUnavailable {
                symbol: symbol.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, symbol: &Symbol, timeout: Duration) -> Result<RawQuote> {
        let url = self.url_for(symbol);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::classify(symbol, timeout, e))?;

        response
            .json::<RawQuote>()
            .map_err(|e| Self::classify(symbol, timeout, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_requires_placeholder() {
        assert!(matches!(
            HttpQuoteSource::new("http://localhost:7000/price"),
            Err(QuoteError::Format(_))
        ));
    }

    #[test]
    fn url_substitutes_symbol() {
        let source = HttpQuoteSource::new("http://localhost:7000/price/{symbol}?fmt=json").unwrap();
        let symbol: Symbol = "aapl".parse().unwrap();
        assert_eq!(
            source.url_for(&symbol),
            "http://localhost:7000/price/AAPL?fmt=json"
        );
    }
}
