//! Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use quote_common::{QuoteError, RawQuote, Result, Symbol};
use quote_server::clock::Clock;
use quote_server::source::QuoteSource;
use quote_server::{QuoteCache, QuoteResolver, RateLimiter, ResolverSettings};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// One scripted answer of the source.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Price only; the resolver has to derive the change.
    Price(f64),
    /// Answer carrying the source's own change figures.
    Full(RawQuote),
    /// The source call fails.
    Fail,
    /// Price delivered only after sleeping this many milliseconds.
    Slow(u64, f64),
    /// The source call panics.
    Panic,
}

/// Source answering from a per-symbol script; unscripted calls fail.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, symbol: &str, step: Step) -> &Self {
        self.script
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push_back(step);
        self
    }

    /// Symbols fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

impl QuoteSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, symbol: &Symbol, _timeout: Duration) -> Result<RawQuote> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), Instant::now()));
        let step = self
            .script
            .lock()
            .unwrap()
            .get_mut(symbol.as_str())
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::Fail);
        match step {
            Step::Price(price) => Ok(RawQuote::price_only(price)),
            Step::Full(raw) => Ok(raw),
            Step::Fail => Err(QuoteError::SourceUnavailable {
                symbol: symbol.to_string(),
                reason: "scripted failure".to_string(),
            }),
            Step::Slow(ms, price) => {
                thread::sleep(Duration::from_millis(ms));
                Ok(RawQuote::price_only(price))
            }
            Step::Panic => panic!("scripted panic for {}", symbol),
        }
    }
}

/// Hand-driven wall clock.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()),
        })
    }

    pub fn advance_ms(&self, ms: i64) {
        *self.now.lock().unwrap() += TimeDelta::milliseconds(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn symbol(s: &str) -> Symbol {
    s.parse().unwrap()
}

/// Resolver over scripted collaborators with a 30s TTL and a 1s fetch timeout.
pub fn resolver(
    source: &Arc<ScriptedSource>,
    clock: &Arc<ManualClock>,
    min_fetch_interval: Duration,
) -> QuoteResolver {
    resolver_with_timeout(source, clock, min_fetch_interval, Duration::from_millis(1_000))
}

pub fn resolver_with_timeout(
    source: &Arc<ScriptedSource>,
    clock: &Arc<ManualClock>,
    min_fetch_interval: Duration,
    fetch_timeout: Duration,
) -> QuoteResolver {
    let settings = ResolverSettings {
        cache_ttl: Duration::from_millis(30_000),
        min_fetch_interval,
        fetch_timeout,
    };
    let source: Arc<dyn QuoteSource> = source.clone();
    let clock: Arc<dyn Clock> = clock.clone();
    QuoteResolver::with_parts(
        source,
        Arc::new(QuoteCache::new()),
        Arc::new(RateLimiter::new(min_fetch_interval)),
        clock,
        settings,
    )
}
