//! HTTP requests to the quote service.
//!
//! This module wraps a blocking `reqwest` client and turns the service's answers into
//! workspace types: `QuoteRecord`s for `/quotes`, a `HealthReport` for `/health`, and
//! `QuoteError`s carrying the service's own error message otherwise.
use log::debug;
use quote_common::health::HealthReport;
use quote_common::{QuoteError, QuoteRecord, Result, Symbol};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Helper type for querying the quote service.
pub struct QuoteFetcher {
    client: Client,
    base_url: String,
}

impl QuoteFetcher {
    /// Create a fetcher for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuoteError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET /quotes?symbols=...`
    pub fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<Vec<QuoteRecord>> {
        let csv = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/quotes", self.base_url);
        debug!("GET {}?symbols={}", url, csv);
        let response = self
            .client
            .get(&url)
            .query(&[("symbols", csv.as_str())])
            .send()
            .map_err(|e| QuoteError::Http(e.to_string()))?;
        Self::decode(response)
    }

    /// `GET /health`
    pub fn fetch_health(&self) -> Result<HealthReport> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| QuoteError::Http(e.to_string()))?;
        Self::decode(response)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|e| QuoteError::Http(e.to_string()))?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        Err(QuoteError::Http(format!("{}: {}", status, message)))
    }
}
