//! Quote source contract and the providers shipped with the server.
//!
//! A `QuoteSource` is the only way the server talks to the outside world: given a
//! symbol it either produces a `RawQuote` or fails. Everything around it (caching,
//! rate limiting, reconciliation of change figures, stale fallback) is handled by the
//! resolver, which also bounds every call with the fetch timeout.
//!
//! - `simulated` — offline random-walk provider.
//! - `http` — JSON-over-HTTP provider driven by a URL template.

pub mod http;
pub mod simulated;

use quote_common::{RawQuote, Result, Symbol};
use std::time::Duration;

pub use http::HttpQuoteSource;
pub use simulated::SimulatedSource;

/// External provider of raw quotes.
///
/// Implementations must be shareable across threads: a single source serves every
/// concurrent request of the process.
pub trait QuoteSource: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Fetch the current quote of `symbol`, giving up after `timeout`.
    ///
    /// Failures are reported as `SourceUnavailable` or `SourceTimeout`; a missing or
    /// zero price is *not* an error at this level and is validated by the caller.
    fn fetch(&self, symbol: &Symbol, timeout: Duration) -> Result<RawQuote>;
}
