//! Exchange-rate tables and the source they are fetched from

use crate::core::currency::CurrencyCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Status value a healthy provider response carries in its `result` field.
pub const SUCCESS_STATUS: &str = "success";

/// Body returned by the rate provider, before any validation.
///
/// `rates` holds units of each currency bought with one RUB.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRates {
    pub result: String,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
    pub rates: Option<HashMap<String, f64>>,
    pub time_last_update_unix: Option<i64>,
    pub time_last_update_utc: Option<String>,
}

impl RawRates {
    pub fn success(rates: impl IntoIterator<Item = (&'static str, f64)>) -> Self {
        RawRates {
            result: SUCCESS_STATUS.to_string(),
            error_type: None,
            rates: Some(rates.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            time_last_update_unix: None,
            time_last_update_utc: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Rate source did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Malformed rate response: {0}")]
    Malformed(String),

    #[error("Rate provider reported an error: {0}")]
    Provider(String),
}

/// No rates could be fetched and nothing was cached before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Exchange rates are unavailable")]
pub struct RatesUnavailable;

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RawRates, FetchError>;
}

/// RUB-denominated multipliers: how many RUB one unit of each currency is worth.
///
/// RUB itself is always present at 1.0 and every multiplier is positive.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<CurrencyCode, f64>,
    updated_at: Option<DateTime<Utc>>,
    source_date: String,
}

impl RateTable {
    pub fn new(
        rates: impl IntoIterator<Item = (CurrencyCode, f64)>,
        updated_at: impl Into<Option<DateTime<Utc>>>,
        source_date: impl Into<String>,
    ) -> Self {
        let mut rates: HashMap<CurrencyCode, f64> = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .collect();
        rates.insert(CurrencyCode::RUB, 1.0);
        RateTable {
            rates,
            updated_at: updated_at.into(),
            source_date: source_date.into(),
        }
    }

    /// Validates a provider response and inverts its "per RUB" figures.
    pub fn from_raw(raw: RawRates) -> Result<Self, FetchError> {
        if raw.result != SUCCESS_STATUS {
            return Err(FetchError::Provider(
                raw.error_type.unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        let api_rates = raw
            .rates
            .ok_or_else(|| FetchError::Malformed("missing `rates`".to_string()))?;

        let rates = api_rates
            .into_iter()
            .filter_map(|(key, per_rub)| match CurrencyCode::new(&key) {
                Some(code) if code != CurrencyCode::RUB && per_rub > 0.0 => {
                    Some((code, 1.0 / per_rub))
                }
                Some(_) => None,
                None => {
                    debug!(key = %key, "Skipping rate with malformed currency code");
                    None
                }
            });

        let updated_at = raw
            .time_last_update_unix
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        Ok(RateTable::new(
            rates,
            updated_at,
            raw.time_last_update_utc.unwrap_or_default(),
        ))
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    /// Number of currencies with a usable rate, RUB included.
    pub fn currency_count(&self) -> usize {
        self.rates.len()
    }

    /// Update time for display: the epoch in UTC, else the provider's own string.
    pub fn update_label(&self) -> String {
        match self.updated_at {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None if !self.source_date.is_empty() => self.source_date.clone(),
            None => "неизвестно".to_string(),
        }
    }
}
