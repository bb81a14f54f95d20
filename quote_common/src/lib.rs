//!
//! Common types and utilities shared by the quote server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` used across the workspace.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `symbols` — `Symbol` normalization and symbol list parsing.
//! - `quote` — `QuoteRecord` served to clients and `RawQuote` produced by sources.
//! - `health` — wire types of the health endpoint.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod health;
pub mod net;
pub mod quote;
pub mod result;
pub mod symbols;

pub use error::QuoteError;
pub use quote::{QuoteRecord, RawQuote};
pub use result::Result;
pub use symbols::Symbol;
