//! Wallet currencies: catalog entries the user actually holds.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use swapform_common::{Currency, PriceRecord, Result, WalletPayload};
use tracing::{debug, info, instrument};

use crate::cache::PriceRepository;
use crate::catalog::PriceCatalog;
use crate::provider::WalletSource;

/// A priced currency together with the user's balance in it.
///
/// Only [`WalletCurrencyResolver`] creates these, so every value is known to
/// be both held and priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletCurrency {
    record: PriceRecord,
    wallet_amount: Decimal,
    wallet_value: Decimal,
}

impl WalletCurrency {
    pub(crate) fn new(record: PriceRecord, wallet_amount: Decimal, wallet_value: Decimal) -> Self {
        Self {
            record,
            wallet_amount,
            wallet_value,
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.record.currency
    }

    /// Catalog price the swap is quoted at.
    pub fn price(&self) -> Decimal {
        self.record.price
    }

    /// The underlying catalog record.
    pub fn record(&self) -> &PriceRecord {
        &self.record
    }

    /// Units held.
    pub fn wallet_amount(&self) -> Decimal {
        self.wallet_amount
    }

    /// USD value of the holding.
    pub fn wallet_value(&self) -> Decimal {
        self.wallet_value
    }

    /// Whether a MAX request would set a non-zero amount.
    pub fn has_balance(&self) -> bool {
        self.wallet_amount > Decimal::ZERO
    }
}

/// Find a wallet currency by symbol.
pub fn find_wallet_currency<'a>(
    wallet: &'a [WalletCurrency],
    currency: &Currency,
) -> Option<&'a WalletCurrency> {
    wallet.iter().find(|w| w.currency() == currency)
}

/// Intersect wallet holdings with the catalog, in catalog order.
pub fn intersect_holdings(
    payload: &WalletPayload,
    catalog: &PriceCatalog,
) -> Result<Vec<WalletCurrency>> {
    let holdings = payload.holdings()?;

    for holding in holdings {
        if !catalog.contains(&holding.currency) {
            debug!(currency = %holding.currency, "Dropping unpriced holding");
        }
    }

    Ok(catalog
        .iter()
        .filter_map(|record| {
            payload.holding_for(&record.currency).map(|holding| {
                WalletCurrency::new(
                    record.clone(),
                    holding.amount_or_zero(),
                    holding.usd_value_or_zero(),
                )
            })
        })
        .collect())
}

/// Resolves the currencies the user can swap from.
pub struct WalletCurrencyResolver {
    wallet: Arc<dyn WalletSource>,
    prices: Arc<PriceRepository>,
}

impl WalletCurrencyResolver {
    /// Create a resolver sharing the application's price repository.
    pub fn new(wallet: Arc<dyn WalletSource>, prices: Arc<PriceRepository>) -> Self {
        Self { wallet, prices }
    }

    /// Fetch holdings and the catalog concurrently and intersect them.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<Vec<WalletCurrency>> {
        let (payload, catalog) =
            tokio::try_join!(self.wallet.fetch_wallet(), self.prices.get_catalog())?;

        let currencies = intersect_holdings(&payload, &catalog)?;
        info!(currencies = currencies.len(), "Wallet currencies resolved");

        Ok(currencies)
    }
}
