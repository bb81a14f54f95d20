//! Ticker symbols and helpers shared between client and server.
//!
//! A `Symbol` is always trimmed, uppercase and non-empty; constructing one is the
//! only normalization step a request goes through before reaching the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::QuoteError;

/// Case-normalized ticker symbol (e.g. `AAPL`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes `raw` (trim + uppercase); returns `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Symbol(trimmed.to_uppercase()))
        }
    }

    /// Borrow the normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::normalize(s).ok_or(QuoteError::NoSymbolsProvided)
    }
}

impl TryFrom<String> for Symbol {
    type Error = QuoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Normalizes every input, dropping the ones that are empty after trimming.
///
/// Input order is preserved and duplicates are kept: each occurrence is resolved.
pub fn normalize_symbols<I, S>(raw: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|s| Symbol::normalize(s.as_ref()))
        .collect()
}

/// Splits a comma separated list (the `symbols` query parameter) and normalizes it.
pub fn parse_csv(csv: &str) -> Vec<Symbol> {
    normalize_symbols(csv.split(','))
}

/// Trait providing file parsing for symbols.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, whitespace or new lines. Empty
    /// entries are skipped; an input without any symbol is an error.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Symbol>, QuoteError>;
}

impl SymbolParser for Symbol {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, QuoteError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(QuoteError::Io)?;
            let tokens = line.split(|c: char| c == ',' || c.is_whitespace());
            symbols.extend(normalize_symbols(tokens));
        }

        if symbols.is_empty() {
            return Err(QuoteError::ParseSymbolsFile(
                "no symbols found in file".to_string(),
            ));
        }
        Ok(symbols)
    }
}
