//! Error types shared between client and server.
//!
//! The `QuoteError` enum unifies the quote acquisition failures (invalid prices,
//! unreachable sources, per-symbol and batch-level outcomes) with the ambient
//! I/O and serialization failures, allowing crates to propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// The quote source answered, but without a usable price (missing, zero or non-finite).
    #[error("No valid price found for {0}")]
    NoValidPrice(String),

    /// The quote source call itself failed (network, upstream status, decoding...).
    #[error("Quote source unavailable for {symbol}: {reason}")]
    SourceUnavailable {
        /// Symbol that was being fetched.
        symbol: String,
        /// Human-readable failure description.
        reason: String,
    },

    /// The quote source did not answer within the configured timeout.
    #[error("Quote source timed out after {timeout_ms}ms for {symbol}")]
    SourceTimeout {
        /// Symbol that was being fetched.
        symbol: String,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// No cached record exists for the symbol and the fetch failed.
    #[error("Quote unavailable for {symbol}: {cause}")]
    QuoteUnavailable {
        /// Symbol that could not be resolved.
        symbol: String,
        /// The underlying fetch failure.
        #[source]
        cause: Box<QuoteError>,
    },

    /// The request did not contain a single usable symbol.
    #[error("No valid symbols provided")]
    NoSymbolsProvided,

    /// Every symbol of a batch failed to resolve.
    #[error("Failed to fetch any of {attempted} symbols")]
    AllSymbolsFailed {
        /// Number of normalized symbols that were attempted.
        attempted: usize,
    },

    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Error while parsing a symbols file.
    #[error("Parse symbols file error: {0}")]
    ParseSymbolsFile(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// HTTP transport failure outside of a quote fetch (client side, server bind...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl QuoteError {
    /// Returns `true` for failures of a single quote source attempt.
    ///
    /// These are the failures that trigger the stale-cache fallback.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            QuoteError::NoValidPrice(_)
                | QuoteError::SourceUnavailable { .. }
                | QuoteError::SourceTimeout { .. }
        )
    }

    /// Wraps a fetch failure into `QuoteUnavailable` for `symbol`.
    pub fn unavailable(symbol: &str, cause: QuoteError) -> Self {
        QuoteError::QuoteUnavailable {
            symbol: symbol.to_string(),
            cause: Box::new(cause),
        }
    }
}

impl<T> From<PoisonError<T>> for QuoteError {
    fn from(err: PoisonError<T>) -> Self {
        QuoteError::MutexLock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_failures_are_grouped() {
        assert!(QuoteError::NoValidPrice("AAPL".into()).is_source_failure());
        assert!(
            QuoteError::SourceTimeout {
                symbol: "AAPL".into(),
                timeout_ms: 10
            }
            .is_source_failure()
        );
        assert!(!QuoteError::NoSymbolsProvided.is_source_failure());
        assert!(!QuoteError::AllSymbolsFailed { attempted: 2 }.is_source_failure());
    }

    #[test]
    fn unavailable_keeps_cause_in_message() {
        let err = QuoteError::unavailable("MSFT", QuoteError::NoValidPrice("MSFT".into()));
        assert_eq!(
            err.to_string(),
            "Quote unavailable for MSFT: No valid price found for MSFT"
        );
    }
}
