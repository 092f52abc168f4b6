//! Swap quote and receipt types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::monetary::Currency;

/// Output side of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OutputAmount {
    /// Not enough information to quote; rendered as an empty field.
    Unavailable,
    /// Computed amount of the output currency.
    Amount(Decimal),
}

impl OutputAmount {
    /// Amount as a number, zero when unavailable.
    pub fn value(&self) -> Decimal {
        match self {
            OutputAmount::Unavailable => Decimal::ZERO,
            OutputAmount::Amount(v) => *v,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, OutputAmount::Amount(_))
    }
}

impl fmt::Display for OutputAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputAmount::Unavailable => Ok(()),
            OutputAmount::Amount(v) => write!(f, "{}", v.normalize()),
        }
    }
}

/// A prospective swap derived from the current form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Amount of the input currency to send.
    pub input_amount: Decimal,
    /// Currency being sent.
    pub input_currency: Option<Currency>,
    /// Amount of the output currency to receive.
    pub output_amount: OutputAmount,
    /// Currency being received.
    pub output_currency: Option<Currency>,
    /// Whether the quote may be submitted.
    pub valid: bool,
}

impl SwapQuote {
    /// The quote for an untouched form.
    pub fn empty() -> Self {
        Self {
            input_amount: Decimal::ZERO,
            input_currency: None,
            output_amount: OutputAmount::Unavailable,
            output_currency: None,
            valid: false,
        }
    }

    /// Both currencies are selected and identical.
    pub fn is_same_currency(&self) -> bool {
        match (&self.input_currency, &self.output_currency) {
            (Some(input), Some(output)) => input == output,
            _ => false,
        }
    }
}

impl Default for SwapQuote {
    fn default() -> Self {
        Self::empty()
    }
}

/// Record of a submitted swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Unique swap ID.
    pub id: Uuid,
    /// Quote that was submitted.
    pub quote: SwapQuote,
    /// When the swap was executed.
    pub executed_at: DateTime<Utc>,
}

impl SwapReceipt {
    /// Create a new receipt for a quote.
    pub fn new(quote: SwapQuote) -> Self {
        Self {
            id: Uuid::now_v7(),
            quote,
            executed_at: Utc::now(),
        }
    }

    /// Confirmation text shown to the user.
    pub fn summary(&self) -> String {
        let input = self
            .quote
            .input_currency
            .as_ref()
            .map(Currency::symbol)
            .unwrap_or_default();
        let output = self
            .quote
            .output_currency
            .as_ref()
            .map(Currency::symbol)
            .unwrap_or_default();
        format!(
            "Swap successful! Sent {} {} and received {} {}",
            self.quote.input_amount.normalize(),
            input,
            self.quote.output_amount.value().normalize(),
            output
        )
    }
}
