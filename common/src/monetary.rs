//! Currency symbols, price records and amount handling.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places shown for a computed output amount.
pub const OUTPUT_DECIMAL_PLACES: u32 = 6;

/// Currency symbol as published by the price feed.
///
/// Symbols are case-sensitive (`bNEO`, `stATOM`), so only surrounding
/// whitespace is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let trimmed = symbol.trim();
        if trimmed.len() == symbol.len() {
            Self(symbol)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// An empty symbol stands for "nothing selected" on the wire.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

/// A single observation from the price feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Currency being priced.
    pub currency: Currency,
    /// When the price was observed.
    pub date: DateTime<Utc>,
    /// Unit price in the feed's reference currency.
    pub price: Decimal,
}

impl PriceRecord {
    /// Create a new price record.
    pub fn new(currency: impl Into<Currency>, date: DateTime<Utc>, price: Decimal) -> Self {
        Self {
            currency: currency.into(),
            date,
            price,
        }
    }

    /// Whether this record can be used as a conversion rate.
    pub fn has_usable_price(&self) -> bool {
        self.price > Decimal::ZERO
    }

    /// Whether this record should replace `other` for the same currency.
    pub fn is_newer_than(&self, other: &PriceRecord) -> bool {
        self.date > other.date
    }
}

/// Round a computed amount for display.
pub fn round_amount(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse free-form amount text typed into the amount field.
///
/// Thousands separators are ignored and the longest leading numeric prefix is
/// used, so `"1,250.5 BTC"` reads as `1250.5`. Anything unparseable is zero.
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return Decimal::ZERO;
    }

    let prefix = &cleaned[..end];
    let (negative, body) = match prefix.as_bytes()[0] {
        b'-' => (true, &prefix[1..]),
        b'+' => (false, &prefix[1..]),
        _ => (false, prefix),
    };
    let body = body.trim_end_matches('.');
    let normalized = if body.starts_with('.') {
        format!("0{}", body)
    } else {
        body.to_string()
    };

    match Decimal::from_str(&normalized) {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_preserves_case() {
        assert_eq!(Currency::new("bNEO").symbol(), "bNEO");
        assert_eq!(Currency::new("  ETH ").symbol(), "ETH");
        assert_ne!(Currency::new("atom"), Currency::new("ATOM"));
    }

    #[test]
    fn test_price_record_from_feed_json() {
        let json = r#"{"currency":"BLUR","date":"2023-08-29T07:10:40.000Z","price":0.2}"#;
        let record: PriceRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.currency, Currency::new("BLUR"));
        assert_eq!(record.price, dec!(0.2));
        assert!(record.has_usable_price());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.5"), dec!(1250.5));
        assert_eq!(parse_amount("  42 "), dec!(42));
        assert_eq!(parse_amount("0.5 BTC"), dec!(0.5));
        assert_eq!(parse_amount(".25"), dec!(0.25));
        assert_eq!(parse_amount("12."), dec!(12));
        assert_eq!(parse_amount("-3"), dec!(-3));
    }

    #[test]
    fn test_parse_amount_malformed_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("."), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
    }

    #[test]
    fn test_round_amount_half_away_from_zero() {
        assert_eq!(round_amount(dec!(1.0000005), 6), dec!(1.000001));
        assert_eq!(round_amount(dec!(111.1111111111), 6), dec!(111.111111));
    }
}
