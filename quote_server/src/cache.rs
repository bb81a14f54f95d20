//! In-memory quote cache.
//!
//! Holds the latest `QuoteRecord` per symbol for the lifetime of the process. Entries
//! are never evicted: a record that is older than the TTL is only treated as stale, and
//! stays available as a fallback when a refresh fails.
//!
//! Only one record per symbol is kept. When a new record replaces an old one, the old
//! price is handed to the caller through [`QuoteCache::put_with`] so the change can be
//! derived, then it is dropped.

use chrono::{DateTime, Utc};
use log::warn;
use quote_common::health::CacheEntryAge;
use quote_common::{QuoteRecord, Symbol};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Returns `true` while `now - record.timestamp < ttl`.
pub fn is_fresh(record: &QuoteRecord, ttl: Duration, now: DateTime<Utc>) -> bool {
    record
        .age(now)
        .to_std()
        .map(|age| age < ttl)
        .unwrap_or(false)
}

/// Thread-safe latest-record-per-symbol store.
#[derive(Debug, Default)]
pub struct QuoteCache {
    entries: Mutex<HashMap<Symbol, QuoteRecord>>,
}

impl QuoteCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the entries, recovering from poison: a half-finished write can at worst
    /// leave one record untouched.
    fn lock(&self) -> MutexGuard<'_, HashMap<Symbol, QuoteRecord>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Quote cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Latest record for `symbol`, fresh or not.
    pub fn get(&self, symbol: &Symbol) -> Option<QuoteRecord> {
        self.lock().get(symbol).cloned()
    }

    /// Overwrite the entry for `record.symbol`.
    pub fn put(&self, record: QuoteRecord) {
        self.put_with(&record.symbol.clone(), move |_| record);
    }

    /// Atomically replace the entry for `symbol` with a record built from the previous one.
    ///
    /// The timestamp of the stored record never moves backwards: if `build` returns a
    /// record older than the one it replaces, the previous timestamp is kept.
    pub fn put_with<F>(&self, symbol: &Symbol, build: F) -> QuoteRecord
    where
        F: FnOnce(Option<&QuoteRecord>) -> QuoteRecord,
    {
        let mut entries = self.lock();
        let previous = entries.get(symbol);
        let mut record = build(previous);
        if let Some(previous) = previous {
            record.timestamp = record.timestamp.max(previous.timestamp);
        }
        entries.insert(symbol.clone(), record.clone());
        record
    }

    /// Number of cached symbols.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Age in milliseconds of every cached entry at `now`.
    pub fn ages(&self, now: DateTime<Utc>) -> Vec<CacheEntryAge> {
        self.lock()
            .values()
            .map(|record| CacheEntryAge {
                symbol: record.symbol.clone(),
                age: record.age(now).num_milliseconds().max(0) as u64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn record(symbol: &str, price: f64, ms: i64) -> QuoteRecord {
        QuoteRecord::new(symbol.parse().unwrap(), price, 0.0, 0.0, at(ms))
    }

    #[test]
    fn get_returns_latest_put() {
        let cache = QuoteCache::new();
        let aapl: Symbol = "AAPL".parse().unwrap();
        assert!(cache.get(&aapl).is_none());

        cache.put(record("AAPL", 100.0, 1_000));
        cache.put(record("AAPL", 101.0, 2_000));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&aapl).unwrap().price, 101.0);
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let r = record("MSFT", 10.0, 10_000);
        let ttl = Duration::from_millis(30_000);
        assert!(is_fresh(&r, ttl, at(10_000)));
        assert!(is_fresh(&r, ttl, at(39_999)));
        assert!(!is_fresh(&r, ttl, at(40_000)));
        assert!(!is_fresh(&r, ttl, at(100_000)));
    }

    #[test]
    fn put_with_sees_previous_record() {
        let cache = QuoteCache::new();
        let tsla: Symbol = "TSLA".parse().unwrap();
        cache.put(record("TSLA", 200.0, 1_000));

        let stored = cache.put_with(&tsla, |prev| {
            let prev_price = prev.map(|p| p.price).unwrap_or_default();
            record("TSLA", prev_price + 5.0, 2_000)
        });

        assert_eq!(stored.price, 205.0);
        assert_eq!(cache.get(&tsla).unwrap(), stored);
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let cache = QuoteCache::new();
        let goog: Symbol = "GOOG".parse().unwrap();
        cache.put(record("GOOG", 1.0, 5_000));
        cache.put(record("GOOG", 2.0, 4_000));

        let stored = cache.get(&goog).unwrap();
        assert_eq!(stored.price, 2.0);
        assert_eq!(stored.timestamp, at(5_000));
    }

    #[test]
    fn ages_report_every_entry() {
        let cache = QuoteCache::new();
        cache.put(record("AAPL", 1.0, 1_000));
        cache.put(record("MSFT", 1.0, 3_000));

        let mut ages = cache.ages(at(1_000) + TimeDelta::milliseconds(4_000));
        ages.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let flat: Vec<(&str, u64)> = ages.iter().map(|a| (a.symbol.as_str(), a.age)).collect();
        assert_eq!(flat, vec![("AAPL", 4_000), ("MSFT", 2_000)]);
    }
}
