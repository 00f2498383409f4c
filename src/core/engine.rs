//! Currency conversion through the RUB pivot.
use crate::core::currency::CurrencyCode;
use crate::core::rates::RateTable;
use thiserror::Error;
use tracing::debug;

/// A validated conversion intent. Amounts are always positive.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionRequest {
    Simple {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    },
    Multi {
        items: Vec<(f64, CurrencyCode)>,
        to: CurrencyCode,
    },
}

impl ConversionRequest {
    /// One item collapses to `Simple`; no items yields nothing.
    pub fn from_items(mut items: Vec<(f64, CurrencyCode)>, to: CurrencyCode) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => {
                let (amount, from) = items.remove(0);
                Some(ConversionRequest::Simple { amount, from, to })
            }
            _ => Some(ConversionRequest::Multi { items, to }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedItem {
    pub amount: f64,
    pub from: CurrencyCode,
    pub converted: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Simple {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
        converted: f64,
        /// Units of `to` per one unit of `from`
        rate: f64,
    },
    Multi {
        items: Vec<ConvertedItem>,
        to: CurrencyCode,
        total: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConversionError {
    #[error("No exchange rate for {0}")]
    MissingRate(CurrencyCode),

    #[error("Amount must be finite and positive, got {0}")]
    NonPositiveAmount(f64),
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Converts `amount` of `from` into `to`, rounded to 4 decimal places.
///
/// `from == to` is not special-cased. Zero, negative and non-finite
/// amounts are refused.
pub fn convert(
    amount: f64,
    from: CurrencyCode,
    to: CurrencyCode,
    table: &RateTable,
) -> Result<f64, ConversionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ConversionError::NonPositiveAmount(amount));
    }
    let from_rate = table.get(&from).ok_or(ConversionError::MissingRate(from))?;
    let to_rate = table.get(&to).ok_or(ConversionError::MissingRate(to))?;
    let pivot_total = amount * from_rate;
    Ok(round4(pivot_total / to_rate))
}

/// Runs a whole request against one table snapshot.
///
/// Multi-item requests stop at the first currency missing from the table.
pub fn convert_request(
    request: &ConversionRequest,
    table: &RateTable,
) -> Result<ConversionResult, ConversionError> {
    match request {
        ConversionRequest::Simple { amount, from, to } => {
            let converted = convert(*amount, *from, *to, table)?;
            debug!(%from, %to, amount, converted, "Converted");
            Ok(ConversionResult::Simple {
                amount: *amount,
                from: *from,
                to: *to,
                converted,
                rate: converted / amount,
            })
        }
        ConversionRequest::Multi { items, to } => {
            let items = items
                .iter()
                .map(|(amount, from)| {
                    convert(*amount, *from, *to, table).map(|converted| ConvertedItem {
                        amount: *amount,
                        from: *from,
                        converted,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let total = items.iter().map(|item| item.converted).sum();
            debug!(%to, items = items.len(), total, "Converted multiple amounts");
            Ok(ConversionResult::Multi {
                items,
                to: *to,
                total,
            })
        }
    }
}
