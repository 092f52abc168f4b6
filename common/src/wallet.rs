//! Wallet holdings as returned by the wallet service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapFormError};
use crate::monetary::Currency;

/// A wallet's balance in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Currency held.
    pub currency: Currency,
    /// Display symbol, if different from the currency code.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Units held.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Value of the holding in USD.
    #[serde(default)]
    pub usd_value: Option<Decimal>,
    /// Average acquisition price.
    #[serde(default)]
    pub avg_buy_price: Option<Decimal>,
    /// When the holding was last refreshed.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Holding {
    /// Create a holding with an amount and USD value.
    pub fn new(currency: impl Into<Currency>, amount: Decimal, usd_value: Decimal) -> Self {
        Self {
            currency: currency.into(),
            symbol: None,
            name: None,
            amount: Some(amount),
            usd_value: Some(usd_value),
            avg_buy_price: None,
            last_updated: None,
        }
    }

    /// Units held, zero when the service omitted the field.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    /// USD value, zero when the service omitted the field.
    pub fn usd_value_or_zero(&self) -> Decimal {
        self.usd_value.unwrap_or(Decimal::ZERO)
    }
}

/// Aggregate wallet balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalBalance {
    #[serde(default)]
    pub usd: Decimal,
    #[serde(default)]
    pub btc: Decimal,
}

/// Wallet data for the current user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub total_balance: Option<TotalBalance>,
    /// Per-currency holdings. `None` means the payload is malformed.
    #[serde(default)]
    pub holdings: Option<Vec<Holding>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl WalletPayload {
    /// Create a payload from a list of holdings.
    pub fn with_holdings(holdings: Vec<Holding>) -> Self {
        Self {
            holdings: Some(holdings),
            ..Default::default()
        }
    }

    /// Borrow the holdings, failing if the payload has none.
    pub fn holdings(&self) -> Result<&[Holding]> {
        self.holdings
            .as_deref()
            .ok_or_else(|| SwapFormError::Data("wallet payload is missing holdings".to_string()))
    }

    /// First holding for a currency.
    pub fn holding_for(&self, currency: &Currency) -> Option<&Holding> {
        self.holdings
            .as_ref()
            .and_then(|h| h.iter().find(|holding| &holding.currency == currency))
    }
}

/// Response envelope used by the wallet service.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<WalletPayload>,
}

impl WalletEnvelope {
    /// Unwrap the payload, treating an unsuccessful response as a fetch failure.
    pub fn into_payload(self) -> Result<WalletPayload> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(SwapFormError::Fetch(
                "failed to fetch wallet data".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_envelope_unwraps_payload() {
        let json = r#"{
            "success": true,
            "data": {
                "userId": "u-1",
                "totalBalance": {"usd": 25000, "btc": 0.5},
                "holdings": [
                    {"currency": "BTC", "amount": 0.5, "usdValue": 25000},
                    {"currency": "ETH", "name": "Ether"}
                ]
            }
        }"#;
        let envelope: WalletEnvelope = serde_json::from_str(json).unwrap();
        let payload = envelope.into_payload().unwrap();
        let holdings = payload.holdings().unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].amount_or_zero(), dec!(0.5));
        assert_eq!(holdings[1].amount_or_zero(), Decimal::ZERO);
        assert_eq!(holdings[1].usd_value_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn test_unsuccessful_envelope_is_fetch_error() {
        let envelope: WalletEnvelope = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(matches!(
            envelope.into_payload(),
            Err(SwapFormError::Fetch(_))
        ));
    }

    #[test]
    fn test_missing_holdings_is_data_error() {
        let payload: WalletPayload = serde_json::from_str(r#"{"userId": "u-1"}"#).unwrap();
        assert!(matches!(payload.holdings(), Err(SwapFormError::Data(_))));
    }

    #[test]
    fn test_holding_for_returns_first_match() {
        let payload = WalletPayload::with_holdings(vec![
            Holding::new("BTC", dec!(1), dec!(50000)),
            Holding::new("BTC", dec!(2), dec!(100000)),
        ]);
        let holding = payload.holding_for(&Currency::new("BTC")).unwrap();
        assert_eq!(holding.amount_or_zero(), dec!(1));
    }
}
