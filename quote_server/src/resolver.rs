//! Per-symbol quote resolution.
//!
//! `QuoteResolver::resolve` answers "what is the price of this symbol" using, in order:
//!
//! 1. the cached record, when it is still fresh (no source call, no rate limiting);
//! 2. a rate-limited call to the quote source, reconciled with the cached record;
//! 3. the cached record again, stale or not, when the fetch failed.
//!
//! Only when the fetch fails *and* nothing is cached does the caller get an error
//! (`QuoteUnavailable`). A failed fetch never removes or alters a cached record.
//!
//! Change figures are taken from the source when it reports them. Otherwise they are
//! derived from the price the new record replaces, which is the only history the cache
//! keeps.

use chrono::{DateTime, Utc};
use crossbeam_channel::{RecvTimeoutError, bounded};
use log::{debug, error, info, warn};
use quote_common::{QuoteError, QuoteRecord, RawQuote, Result, Symbol};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cache::{QuoteCache, is_fresh};
use crate::clock::{Clock, SystemClock};
use crate::rate_limiter::RateLimiter;
use crate::source::QuoteSource;

/// Default freshness window of a cached record.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);
/// Default minimum spacing between two source calls.
pub const DEFAULT_MIN_FETCH_INTERVAL: Duration = Duration::from_millis(5_000);
/// Default bound on a single source call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Tunables of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// A record younger than this is served without calling the source.
    pub cache_ttl: Duration,
    /// Minimum spacing between source calls, across all symbols.
    pub min_fetch_interval: Duration,
    /// Bound on one source call, enforced by the resolver.
    pub fetch_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            min_fetch_interval: DEFAULT_MIN_FETCH_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Build the record for a successful fetch of `price`.
///
/// - change figures reported by the source are used as-is (a missing percent is 0);
/// - otherwise they are derived from `previous`;
/// - with neither, both are zero.
pub fn reconcile(
    symbol: &Symbol,
    price: f64,
    raw: &RawQuote,
    previous: Option<&QuoteRecord>,
    now: DateTime<Utc>,
) -> QuoteRecord {
    let (change, percent) = match (raw.change, previous) {
        (Some(change), _) => (change, raw.percent.unwrap_or(0.0)),
        (None, Some(previous)) => {
            let change = price - previous.price;
            (change, percent_of(change, previous.price))
        }
        (None, None) => (0.0, 0.0),
    };
    QuoteRecord::new(symbol.clone(), price, change, percent, now)
}

fn percent_of(change: f64, base: f64) -> f64 {
    if base != 0.0 {
        change / base * 100.0
    } else {
        0.0
    }
}

/// Cache-first, rate-limited, stale-tolerant resolver for single symbols.
pub struct QuoteResolver {
    source: Arc<dyn QuoteSource>,
    cache: Arc<QuoteCache>,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    settings: ResolverSettings,
}

impl QuoteResolver {
    /// Resolver with its own empty cache, its own limiter and the system clock.
    pub fn new(source: Arc<dyn QuoteSource>, settings: ResolverSettings) -> Self {
        Self::with_parts(
            source,
            Arc::new(QuoteCache::new()),
            Arc::new(RateLimiter::new(settings.min_fetch_interval)),
            Arc::new(SystemClock),
            settings,
        )
    }

    /// Resolver built from explicit collaborators.
    ///
    /// The limiter's own interval wins over `settings.min_fetch_interval`.
    pub fn with_parts(
        source: Arc<dyn QuoteSource>,
        cache: Arc<QuoteCache>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            source,
            cache,
            limiter,
            clock,
            settings,
        }
    }

    /// Shared cache backing this resolver.
    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    /// Clock used for timestamps and freshness.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Resolve `symbol` to a record, fresh when possible, stale when the source fails.
    pub fn resolve(&self, symbol: &Symbol) -> Result<QuoteRecord> {
        if let Some(cached) = self.cache.get(symbol) {
            if is_fresh(&cached, self.settings.cache_ttl, self.clock.now()) {
                debug!("Cache hit for {}", symbol);
                return Ok(cached);
            }
        }

        info!("Fetching {} from {} source", symbol, self.source.name());
        match self.fetch_price(symbol) {
            Ok((price, raw)) => {
                let now = self.clock.now();
                let record = self.cache.put_with(symbol, |previous| {
                    reconcile(symbol, price, &raw, previous, now)
                });
                info!(
                    "{}: price={} change={} percent={}",
                    symbol, record.price, record.change, record.percent
                );
                Ok(record)
            }
            Err(cause) => {
                error!("Error fetching {}: {}", symbol, cause);
                match self.cache.get(symbol) {
                    Some(stale) => {
                        warn!("Returning stale cache for {}", symbol);
                        Ok(stale)
                    }
                    None => Err(QuoteError::unavailable(symbol.as_str(), cause)),
                }
            }
        }
    }

    /// One rate-limited source call, bounded by the fetch timeout, with the price validated.
    fn fetch_price(&self, symbol: &Symbol) -> Result<(f64, RawQuote)> {
        let raw = self.fetch_raw(symbol)?;
        match raw.valid_price() {
            Some(price) => Ok((price, raw)),
            None => Err(QuoteError::NoValidPrice(symbol.to_string())),
        }
    }

    /// Runs the rate limiter wait and the source call on a worker thread.
    ///
    /// The wait for the limiter is not bounded; only the source call is. A worker that
    /// overruns the timeout is not cancelled and its late result is dropped.
    fn fetch_raw(&self, symbol: &Symbol) -> Result<RawQuote> {
        let timeout = self.settings.fetch_timeout;
        let (started_tx, started_rx) = bounded::<()>(1);
        let (result_tx, result_rx) = bounded(1);
        let source = Arc::clone(&self.source);
        let limiter = Arc::clone(&self.limiter);
        let worker_symbol = symbol.clone();

        thread::Builder::new()
            .name(format!("fetch-{}", symbol))
            .spawn(move || {
                limiter.acquire();
                let _ = started_tx.send(());
                let _ = result_tx.send(source.fetch(&worker_symbol, timeout));
            })
            .map_err(|e| QuoteError::SourceUnavailable {
                symbol: symbol.to_string(),
                reason: format!("failed to spawn fetch worker: {}", e),
            })?;

        let worker_gone = || QuoteError::SourceUnavailable {
            symbol: symbol.to_string(),
            reason: "fetch worker exited without a result".to_string(),
        };
        started_rx.recv().map_err(|_| worker_gone())?;

        match result_rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "{} fetch for {} overran {}ms",
                    self.source.name(),
                    symbol,
                    timeout.as_millis()
                );
                Err(QuoteError::SourceTimeout {
                    symbol: symbol.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(worker_gone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn symbol(s: &str) -> Symbol {
        s.parse().unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn previous(price: f64) -> QuoteRecord {
        QuoteRecord::new(symbol("AAPL"), price, 0.0, 0.0, at(0))
    }

    #[test]
    fn change_derived_from_previous_price() {
        let prev = previous(100.0);
        let raw = RawQuote::price_only(110.0);
        let record = reconcile(&symbol("AAPL"), 110.0, &raw, Some(&prev), at(1));
        assert!((record.change - 10.0).abs() < 1e-9);
        assert!((record.percent - 10.0).abs() < 1e-9);
        assert_eq!(record.timestamp, at(1));
    }

    #[test]
    fn no_previous_means_no_change() {
        let record = reconcile(&symbol("AAPL"), 50.0, &RawQuote::price_only(50.0), None, at(1));
        assert_eq!(record.change, 0.0);
        assert_eq!(record.percent, 0.0);
        assert_eq!(record.name, "AAPL");
    }

    #[test]
    fn unchanged_price_resets_change() {
        let prev = QuoteRecord::new(symbol("AAPL"), 42.0, 3.0, 7.7, at(0));
        let raw = RawQuote::price_only(42.0);
        let record = reconcile(&symbol("AAPL"), 42.0, &raw, Some(&prev), at(1));
        assert_eq!(record.change, 0.0);
        assert_eq!(record.percent, 0.0);
    }

    #[test]
    fn source_figures_win_over_derivation() {
        let prev = previous(100.0);
        let raw = RawQuote::with_change(110.0, 2.0, 1.85);
        let record = reconcile(&symbol("AAPL"), 110.0, &raw, Some(&prev), at(1));
        assert_eq!(record.change, 2.0);
        assert_eq!(record.percent, 1.85);
    }

    #[test]
    fn reported_change_without_percent_gives_zero_percent() {
        let prev = previous(50.0);
        let raw = RawQuote {
            price: Some(110.0),
            change: Some(10.0),
            percent: None,
        };
        let record = reconcile(&symbol("AAPL"), 110.0, &raw, Some(&prev), at(1));
        assert_eq!(record.change, 10.0);
        assert_eq!(record.percent, 0.0);
    }

    #[test]
    fn previous_zero_price_gives_zero_percent() {
        let prev = previous(0.0);
        let raw = RawQuote::price_only(5.0);
        let record = reconcile(&symbol("AAPL"), 5.0, &raw, Some(&prev), at(1));
        assert_eq!(record.change, 5.0);
        assert_eq!(record.percent, 0.0);
    }

    #[test]
    fn default_settings_match_service_defaults() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.cache_ttl, Duration::from_secs(30));
        assert_eq!(settings.min_fetch_interval, Duration::from_secs(5));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(15));
    }
}
