//! Best-effort resolution of a list of symbols.
//!
//! Symbols are resolved strictly one after another, in request order, through the shared
//! `QuoteResolver`: resolving them concurrently would defeat the global rate limiter.
//! A symbol that cannot be resolved is skipped and recorded as a `SymbolOutcome::Skipped`
//! instead of aborting its siblings. The batch as a whole fails only on empty input or
//! when not a single symbol could be resolved.

use log::{info, warn};
use quote_common::symbols::normalize_symbols;
use quote_common::{QuoteError, QuoteRecord, Result, Symbol};
use std::sync::Arc;

use crate::resolver::QuoteResolver;

/// Result of resolving one symbol of a batch.
#[derive(Debug)]
pub enum SymbolOutcome {
    /// The symbol resolved (fresh, refreshed or stale fallback).
    Resolved(QuoteRecord),
    /// The symbol could not be resolved and was left out of the answer.
    Skipped {
        /// Symbol that was skipped.
        symbol: Symbol,
        /// Why it was skipped.
        reason: QuoteError,
    },
}

impl SymbolOutcome {
    /// The record, if the symbol resolved.
    pub fn into_record(self) -> Option<QuoteRecord> {
        match self {
            SymbolOutcome::Resolved(record) => Some(record),
            SymbolOutcome::Skipped { .. } => None,
        }
    }
}

/// Sequential multi-symbol resolver.
pub struct BatchResolver {
    resolver: Arc<QuoteResolver>,
}

impl BatchResolver {
    /// Wrap a shared resolver.
    pub fn new(resolver: Arc<QuoteResolver>) -> Self {
        Self { resolver }
    }

    /// The underlying single-symbol resolver.
    pub fn resolver(&self) -> &Arc<QuoteResolver> {
        &self.resolver
    }

    /// Resolve every symbol in order, one outcome per input symbol.
    pub fn resolve_outcomes(&self, symbols: &[Symbol]) -> Vec<SymbolOutcome> {
        symbols
            .iter()
            .map(|symbol| match self.resolver.resolve(symbol) {
                Ok(record) => SymbolOutcome::Resolved(record),
                Err(reason) => {
                    warn!("Failed to resolve {}: {}", symbol, reason);
                    SymbolOutcome::Skipped {
                        symbol: symbol.clone(),
                        reason,
                    }
                }
            })
            .collect()
    }

    /// Resolve already normalized symbols.
    ///
    /// Fails with `NoSymbolsProvided` on an empty list and `AllSymbolsFailed` when no
    /// symbol resolved; otherwise returns the resolved records in input order.
    pub fn resolve_symbols(&self, symbols: &[Symbol]) -> Result<Vec<QuoteRecord>> {
        if symbols.is_empty() {
            return Err(QuoteError::NoSymbolsProvided);
        }
        info!(
            "Request for symbols: {}",
            symbols
                .iter()
                .map(Symbol::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let records: Vec<QuoteRecord> = self
            .resolve_outcomes(symbols)
            .into_iter()
            .filter_map(SymbolOutcome::into_record)
            .collect();

        if records.is_empty() {
            return Err(QuoteError::AllSymbolsFailed {
                attempted: symbols.len(),
            });
        }
        Ok(records)
    }

    /// Normalize raw input (trim, uppercase, drop empties) and resolve it.
    pub fn resolve_batch<I, S>(&self, raw: I) -> Result<Vec<QuoteRecord>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_symbols(&normalize_symbols(raw))
    }
}
