//! Wire types of the `GET /health` endpoint.
use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Age of one cached symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryAge {
    /// Cached symbol.
    pub symbol: Symbol,
    /// Milliseconds since the last cache write for this symbol.
    pub age: u64,
}

/// Health payload: how many symbols are cached and how old each entry is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always `"ok"` while the service answers.
    pub status: String,
    /// Number of cached symbols.
    pub cached_symbols: usize,
    /// Per-symbol ages, sorted by symbol.
    pub cache: Vec<CacheEntryAge>,
}

impl HealthReport {
    /// Build an `ok` report from per-symbol ages.
    pub fn ok(mut cache: Vec<CacheEntryAge>) -> Self {
        cache.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Self {
            status: "ok".to_string(),
            cached_symbols: cache.len(),
            cache,
        }
    }
}
