//! Quote data model.
//!
//! A `QuoteRecord` is the payload served to clients: the normalized symbol, a display
//! name, the last known price, the change since the previously known price and a
//! millisecond UTC timestamp of the moment it was fetched. A `RawQuote` is what a quote
//! source hands back before any reconciliation happens.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Market quote for a single ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Normalized symbol identifier.
    pub symbol: Symbol,
    /// Display name; the symbol itself when nothing richer is known.
    pub name: String,
    /// Last known price.
    pub price: f64,
    /// Absolute change since the previously known price.
    pub change: f64,
    /// Relative change in percent.
    pub percent: f64,
    /// UTC instant the record was produced, encoded as milliseconds since Unix epoch.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl QuoteRecord {
    /// Build a record named after its symbol.
    pub fn new(
        symbol: Symbol,
        price: f64,
        change: f64,
        percent: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: symbol.to_string(),
            symbol,
            price,
            change,
            percent,
            timestamp,
        }
    }

    /// Age of the record at `now`. Never negative.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.timestamp).max(TimeDelta::zero())
    }
}

/// Unreconciled answer of a quote source.
///
/// Every field is optional on the wire; only `price` is required for the quote to be
/// usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Price reported by the source.
    #[serde(default)]
    pub price: Option<f64>,
    /// Absolute change reported by the source, if any.
    #[serde(default)]
    pub change: Option<f64>,
    /// Percent change reported by the source, if any.
    #[serde(default)]
    pub percent: Option<f64>,
}

impl RawQuote {
    /// A quote carrying only a price.
    pub fn price_only(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    /// A quote carrying a price and the source's own change figures.
    pub fn with_change(price: f64, change: f64, percent: f64) -> Self {
        Self {
            price: Some(price),
            change: Some(change),
            percent: Some(percent),
        }
    }

    /// The price if it is present, finite and non-zero.
    pub fn valid_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite() && *p != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn symbol(s: &str) -> Symbol {
        s.parse().unwrap()
    }

    #[test]
    fn record_json_shape() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let record = QuoteRecord::new(symbol("aapl"), 190.5, 1.5, 0.79, ts);
        let value: serde_json::Value =
            serde_json::from_slice(&serde_json::to_vec(&record).unwrap()).unwrap();
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["name"], "AAPL");
        assert_eq!(value["price"], 190.5);
        assert_eq!(value["timestamp"], 1_700_000_000_123i64);
    }

    #[test]
    fn age_is_clamped_at_zero() {
        let ts = Utc.timestamp_millis_opt(10_000).unwrap();
        let record = QuoteRecord::new(symbol("x"), 1.0, 0.0, 0.0, ts);
        let earlier = Utc.timestamp_millis_opt(5_000).unwrap();
        let later = Utc.timestamp_millis_opt(12_500).unwrap();
        assert_eq!(record.age(earlier), TimeDelta::zero());
        assert_eq!(record.age(later), TimeDelta::milliseconds(2_500));
    }

    #[test]
    fn invalid_prices_are_filtered() {
        assert_eq!(RawQuote::default().valid_price(), None);
        assert_eq!(RawQuote::price_only(0.0).valid_price(), None);
        assert_eq!(RawQuote::price_only(f64::NAN).valid_price(), None);
        assert_eq!(RawQuote::price_only(f64::INFINITY).valid_price(), None);
        assert_eq!(RawQuote::price_only(-3.5).valid_price(), Some(-3.5));
    }

    #[test]
    fn raw_quote_fields_are_optional_on_the_wire() {
        let raw: RawQuote = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        assert_eq!(raw, RawQuote::price_only(12.5));
        let raw: RawQuote = serde_json::from_str(r#"{"price": null, "change": 1}"#).unwrap();
        assert_eq!(raw.valid_price(), None);
        assert_eq!(raw.change, Some(1.0));
    }
}
