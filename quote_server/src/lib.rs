//! Quote acquisition service.
//!
//! Serves near-real-time quotes for arbitrary symbols from a single, rate-limited quote
//! source. The building blocks, leaves first:
//!
//! - `source` — `QuoteSource` contract and the shipped providers.
//! - `cache` — latest record per symbol and freshness checks.
//! - `rate_limiter` — process-wide minimum spacing between source calls.
//! - `resolver` — cache-first, rate-limited, stale-tolerant resolution of one symbol.
//! - `batch` — sequential, best-effort resolution of a symbol list.
//! - `api` — `GET /quotes` and `GET /health` over axum.
//! - `config` — command-line / environment options.
#![warn(missing_docs)]
pub mod api;
pub mod batch;
pub mod cache;
pub mod clock;
pub mod config;
pub mod rate_limiter;
pub mod resolver;
pub mod source;

pub use batch::{BatchResolver, SymbolOutcome};
pub use cache::QuoteCache;
pub use rate_limiter::RateLimiter;
pub use resolver::{QuoteResolver, ResolverSettings};
