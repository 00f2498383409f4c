//! Core business logic: currencies, rates, query parsing and conversion

pub mod cache;
pub mod config;
pub mod currency;
pub mod engine;
pub mod log;
pub mod query;
pub mod rates;

// Re-export main types for cleaner imports
pub use cache::RateCache;
pub use currency::{CurrencyCode, CurrencyRegistry};
pub use engine::{ConversionError, ConversionRequest, ConversionResult};
pub use query::{ParseError, ParsedQuery, QueryParser};
pub use rates::{FetchError, RateSource, RateTable, RatesUnavailable, RawRates};
