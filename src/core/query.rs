//! Free-form conversion queries such as `100 usd rub` or `30 usd и 40 eur в rub`.
//!
//! Two shapes are understood. With a separator word (`в`, `to`, `in`, ...)
//! the text reads `<amount> <currency> [filler] <amount> <currency> ... <sep> <target>`.
//! Without one, tokens are positional: a lone currency asks for its rate,
//! `<amount> <from> <to>` converts, and longer odd-length lists are
//! amount/currency pairs followed by the target.
//!
//! Parsing is all-or-nothing: a single malformed pair rejects the whole query.

use crate::core::currency::{CurrencyCode, CurrencyRegistry};
use crate::core::engine::ConversionRequest;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    Convert(ConversionRequest),
    /// A bare currency: show its rate, nothing to convert
    RateOnly(CurrencyCode),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Query is empty")]
    Empty,

    #[error("Query does not match any known format")]
    Unrecognized,

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must be positive: {0}")]
    NonPositiveAmount(String),
}

fn looks_numeric(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty()
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Parses a user-typed amount, accepting `,` as the decimal separator.
///
/// Any float notation goes (`1e3`, `+5`); the result must be finite and positive.
pub fn parse_amount(token: &str) -> Result<f64, ParseError> {
    let token = token.trim();
    let amount: f64 = token
        .replace(',', ".")
        .parse()
        .map_err(|_| ParseError::InvalidAmount(token.to_string()))?;
    if !amount.is_finite() {
        return Err(ParseError::InvalidAmount(token.to_string()));
    }
    if amount <= 0.0 {
        return Err(ParseError::NonPositiveAmount(token.to_string()));
    }
    Ok(amount)
}

pub struct QueryParser<'a> {
    registry: &'a CurrencyRegistry,
    separators: &'a [String],
}

impl<'a> QueryParser<'a> {
    pub fn new(registry: &'a CurrencyRegistry, separators: &'a [String]) -> Self {
        Self {
            registry,
            separators,
        }
    }

    pub fn parse(&self, text: &str) -> Result<ParsedQuery, ParseError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        match self.find_separator(&tokens) {
            Some(pos) => {
                debug!(separator = tokens[pos], "Parsing directional query");
                self.parse_directional(&tokens[..pos], &tokens[pos + 1..])
            }
            None => {
                debug!(tokens = tokens.len(), "Parsing positional query");
                self.parse_positional(&tokens)
            }
        }
    }

    fn is_separator(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.separators.iter().any(|s| s.to_lowercase() == token)
    }

    /// A separator only counts with words on both sides of it.
    fn find_separator(&self, tokens: &[&str]) -> Option<usize> {
        (1..tokens.len().saturating_sub(1)).find(|&i| self.is_separator(tokens[i]))
    }

    fn resolve(&self, token: &str) -> Result<CurrencyCode, ParseError> {
        self.registry
            .resolve(token)
            .ok_or_else(|| ParseError::UnknownCurrency(token.to_string()))
    }

    fn parse_directional(
        &self,
        sources: &[&str],
        rest: &[&str],
    ) -> Result<ParsedQuery, ParseError> {
        let target_tokens: Vec<&str> = rest
            .iter()
            .take_while(|t| !self.is_separator(t))
            .copied()
            .collect();
        if target_tokens.is_empty() {
            return Err(ParseError::Unrecognized);
        }
        let target = self.resolve(&target_tokens.join(" "))?;

        let mut items = Vec::new();
        let mut i = 0;
        while i < sources.len() {
            if looks_numeric(sources[i]) {
                let amount = parse_amount(sources[i])?;
                let currency = sources.get(i + 1).ok_or(ParseError::Unrecognized)?;
                items.push((amount, self.resolve(currency)?));
                i += 2;
            } else {
                // filler such as "и" / "and"
                i += 1;
            }
        }

        ConversionRequest::from_items(items, target)
            .map(ParsedQuery::Convert)
            .ok_or(ParseError::Unrecognized)
    }

    fn parse_positional(&self, tokens: &[&str]) -> Result<ParsedQuery, ParseError> {
        match tokens.len() {
            1 => self
                .registry
                .resolve(tokens[0])
                .map(ParsedQuery::RateOnly)
                .ok_or(ParseError::Unrecognized),
            3 => {
                let amount = parse_amount(tokens[0])?;
                let from = self.resolve(tokens[1])?;
                let to = self.resolve(tokens[2])?;
                Ok(ParsedQuery::Convert(ConversionRequest::Simple {
                    amount,
                    from,
                    to,
                }))
            }
            n if n >= 4 && n % 2 == 1 => {
                let target = self.resolve(tokens[n - 1])?;
                let items = tokens[..n - 1]
                    .chunks_exact(2)
                    .map(|pair| Ok((parse_amount(pair[0])?, self.resolve(pair[1])?)))
                    .collect::<Result<Vec<_>, ParseError>>()?;
                ConversionRequest::from_items(items, target)
                    .map(ParsedQuery::Convert)
                    .ok_or(ParseError::Unrecognized)
            }
            _ => Err(ParseError::Unrecognized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn parse(text: &str) -> Result<ParsedQuery, ParseError> {
        let config = AppConfig::default_config().unwrap();
        let registry = config.registry();
        QueryParser::new(&registry, &config.separators).parse(text)
    }

    fn simple(amount: f64, from: &str, to: &str) -> ParsedQuery {
        ParsedQuery::Convert(ConversionRequest::Simple {
            amount,
            from: code(from),
            to: code(to),
        })
    }

    #[test]
    fn test_positional_simple() {
        assert_eq!(parse("100 USD RUB"), Ok(simple(100.0, "USD", "RUB")));
        assert_eq!(parse("  100   usd\trub "), Ok(simple(100.0, "USD", "RUB")));
        assert_eq!(parse("12,5 евро доллар"), Ok(simple(12.5, "EUR", "USD")));
    }

    #[test]
    fn test_directional_multi() {
        assert_eq!(
            parse("30 usd и 40 eur в rub"),
            Ok(ParsedQuery::Convert(ConversionRequest::Multi {
                items: vec![(30.0, code("USD")), (40.0, code("EUR"))],
                to: code("RUB"),
            }))
        );
    }

    #[test]
    fn test_directional_simple_with_aliases() {
        assert_eq!(parse("50 евро в рубли"), Ok(simple(50.0, "EUR", "RUB")));
        assert_eq!(parse("100 USD to EUR"), Ok(simple(100.0, "USD", "EUR")));
        assert_eq!(parse("7.5 cny in kzt"), Ok(simple(7.5, "CNY", "KZT")));
    }

    #[test]
    fn test_directional_multi_word_target() {
        assert_eq!(
            parse("10 usd в белорусский рубль"),
            Ok(simple(10.0, "USD", "BYN"))
        );
    }

    #[test]
    fn test_directional_rejects_partial_lists() {
        assert_eq!(
            parse("30 usd и 40 xyz в rub"),
            Err(ParseError::UnknownCurrency("xyz".to_string()))
        );
        // trailing amount with no currency after it
        assert_eq!(parse("30 usd и 40 в rub"), Err(ParseError::Unrecognized));
        assert_eq!(
            parse("30 usd и 1.2.3 eur в rub"),
            Err(ParseError::InvalidAmount("1.2.3".to_string()))
        );
    }

    #[test]
    fn test_directional_unknown_target() {
        assert_eq!(
            parse("100 usd в xyz"),
            Err(ParseError::UnknownCurrency("xyz".to_string()))
        );
    }

    #[test]
    fn test_directional_without_amounts() {
        assert_eq!(parse("usd в rub"), Err(ParseError::Unrecognized));
    }

    #[test]
    fn test_rate_only() {
        assert_eq!(parse("usd"), Ok(ParsedQuery::RateOnly(code("USD"))));
        assert_eq!(parse("дол"), Ok(ParsedQuery::RateOnly(code("USD"))));
    }

    #[test]
    fn test_unparseable_input() {
        assert_eq!(parse("abc"), Err(ParseError::Unrecognized));
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("100 usd"), Err(ParseError::Unrecognized));
        assert_eq!(parse("10 usd 20 eur"), Err(ParseError::Unrecognized));
        assert_eq!(
            parse("abc def ghi"),
            Err(ParseError::InvalidAmount("abc".to_string()))
        );
        assert_eq!(
            parse("100 qqq rub"),
            Err(ParseError::UnknownCurrency("qqq".to_string()))
        );
    }

    #[test]
    fn test_positional_amount_takes_any_float_notation() {
        assert_eq!(parse("1e3 usd rub"), Ok(simple(1000.0, "USD", "RUB")));
        assert_eq!(parse("+5 usd rub"), Ok(simple(5.0, "USD", "RUB")));
        assert_eq!(
            parse("inf usd rub"),
            Err(ParseError::InvalidAmount("inf".to_string()))
        );
        assert_eq!(
            parse("NaN usd rub"),
            Err(ParseError::InvalidAmount("NaN".to_string()))
        );
    }

    #[test]
    fn test_positional_multi() {
        assert_eq!(
            parse("10 usd 20 eur 5 cny rub"),
            Ok(ParsedQuery::Convert(ConversionRequest::Multi {
                items: vec![(10.0, code("USD")), (20.0, code("EUR")), (5.0, code("CNY"))],
                to: code("RUB"),
            }))
        );
        assert_eq!(
            parse("10 usd 20 eur rub"),
            Ok(ParsedQuery::Convert(ConversionRequest::Multi {
                items: vec![(10.0, code("USD")), (20.0, code("EUR"))],
                to: code("RUB"),
            }))
        );
    }

    #[test]
    fn test_positional_multi_is_all_or_nothing() {
        assert_eq!(
            parse("10 usd 20 qqq rub"),
            Err(ParseError::UnknownCurrency("qqq".to_string()))
        );
        assert_eq!(
            parse("10 usd x eur rub"),
            Err(ParseError::InvalidAmount("x".to_string()))
        );
    }

    #[test]
    fn test_non_positive_amounts_are_rejected() {
        assert_eq!(
            parse("-5 usd rub"),
            Err(ParseError::NonPositiveAmount("-5".to_string()))
        );
        assert_eq!(
            parse("0 usd в rub"),
            Err(ParseError::NonPositiveAmount("0".to_string()))
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("42"), Ok(42.0));
        assert_eq!(parse_amount(" 3,75 "), Ok(3.75));
        assert_eq!(parse_amount("inf"), Err(ParseError::InvalidAmount("inf".to_string())));
        assert_eq!(parse_amount("."), Err(ParseError::InvalidAmount(".".to_string())));
        assert_eq!(parse_amount("-"), Err(ParseError::InvalidAmount("-".to_string())));
        assert_eq!(parse_amount("2.5E2"), Ok(250.0));
        assert_eq!(parse_amount("lots"), Err(ParseError::InvalidAmount("lots".to_string())));
    }
}
