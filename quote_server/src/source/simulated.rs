//! Offline quote source producing a random walk per symbol.
//!
//! Every symbol starts at a random price and then moves by at most ±1% per fetch.
//! The source never reports change figures, so the resolver derives them from the
//! previously cached price. An optional failure rate makes it drop some fetches, which
//! is handy to watch the stale fallback at work.

use log::debug;
use quote_common::{QuoteError, RawQuote, Result, Symbol};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::QuoteSource;

/// Random-walk quote generator.
#[derive(Debug)]
pub struct SimulatedSource {
    prices: Mutex<HashMap<Symbol, f64>>,
    failure_rate: f64,
}

impl SimulatedSource {
    /// A source that never fails.
    pub fn new() -> Self {
        Self::with_failure_rate(0.0)
    }

    /// A source that fails each fetch with probability `failure_rate` (clamped to `[0, 1]`).
    pub fn with_failure_rate(failure_rate: f64) -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Calculate the next price using a small random walk around `current_price`.
    ///
    /// The change is sampled uniformly from `[-1%, +1%)` and the result is clamped to a
    /// minimum positive value so the price never reaches zero.
    pub fn next_price(current_price: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-0.01..0.01);
        let new_price = current_price * (1.0 + change);
        new_price.max(0.01)
    }

    fn initial_price() -> f64 {
        let mut rng = rand::rng();
        (rng.random_range(20.0..500.0_f64) * 100.0).round() / 100.0
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn fetch(&self, symbol: &Symbol, _timeout: Duration) -> Result<RawQuote> {
        if self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate) {
            return Err(QuoteError::SourceUnavailable {
                symbol: symbol.to_string(),
                reason: "simulated outage".to_string(),
            });
        }

        let mut prices = self.prices.lock()?;
        let price = match prices.get(symbol) {
            Some(current) => Self::next_price(*current),
            None => Self::initial_price(),
        };
        prices.insert(symbol.clone(), price);
        debug!("Simulated {} at {:.2}", symbol, price);

        Ok(RawQuote::price_only(price))
    }
}
