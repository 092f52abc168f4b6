//! Deduplicated latest-price catalog.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use swapform_common::{Currency, PriceRecord};

/// Latest known price per currency, ordered by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceCatalog {
    entries: BTreeMap<Currency, PriceRecord>,
}

impl PriceCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a raw feed, keeping the latest record per currency.
    ///
    /// A record only replaces an existing one when its date is strictly later.
    pub fn from_records(records: impl IntoIterator<Item = PriceRecord>) -> Self {
        let mut entries: BTreeMap<Currency, PriceRecord> = BTreeMap::new();

        for record in records {
            match entries.get(&record.currency) {
                Some(existing) if !record.is_newer_than(existing) => {}
                _ => {
                    entries.insert(record.currency.clone(), record);
                }
            }
        }

        Self { entries }
    }

    /// Get the record for a currency.
    pub fn get(&self, currency: &Currency) -> Option<&PriceRecord> {
        self.entries.get(currency)
    }

    /// Get the price for a currency.
    pub fn price_of(&self, currency: &Currency) -> Option<Decimal> {
        self.entries.get(currency).map(|r| r.price)
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.entries.contains_key(currency)
    }

    /// Iterate records in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &PriceRecord> {
        self.entries.values()
    }

    /// Records in ascending symbol order.
    pub fn records(&self) -> Vec<PriceRecord> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_693_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_keeps_latest_record() {
        let catalog = PriceCatalog::from_records(vec![
            PriceRecord::new("ETH", at(10), dec!(1600)),
            PriceRecord::new("ETH", at(30), dec!(1645.93)),
            PriceRecord::new("ETH", at(20), dec!(1620)),
            PriceRecord::new("ATOM", at(5), dec!(7.18)),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price_of(&Currency::new("ETH")), Some(dec!(1645.93)));
        assert_eq!(catalog.price_of(&Currency::new("ATOM")), Some(dec!(7.18)));
    }

    #[test]
    fn test_equal_dates_keep_first_seen() {
        let catalog = PriceCatalog::from_records(vec![
            PriceRecord::new("USDC", at(0), dec!(1)),
            PriceRecord::new("USDC", at(0), dec!(0.99)),
        ]);

        assert_eq!(catalog.price_of(&Currency::new("USDC")), Some(dec!(1)));
    }

    #[test]
    fn test_iterates_by_symbol() {
        let catalog = PriceCatalog::from_records(vec![
            PriceRecord::new("USDC", at(0), dec!(1)),
            PriceRecord::new("ATOM", at(0), dec!(7)),
            PriceRecord::new("ETH", at(0), dec!(1600)),
        ]);

        let symbols: Vec<&str> = catalog.iter().map(|r| r.currency.symbol()).collect();
        assert_eq!(symbols, vec!["ATOM", "ETH", "USDC"]);
    }

    proptest! {
        #[test]
        fn prop_catalog_keeps_max_date(
            feed in prop::collection::vec((0usize..5, 0i64..10_000, 0u32..1_000_000), 1..60)
        ) {
            let symbols = ["ATOM", "BTC", "ETH", "OSMO", "USDC"];
            let records: Vec<PriceRecord> = feed
                .iter()
                .map(|(s, secs, price)| {
                    PriceRecord::new(symbols[*s], at(0) + Duration::seconds(*secs), Decimal::from(*price))
                })
                .collect();

            let catalog = PriceCatalog::from_records(records.clone());

            for record in catalog.iter() {
                let max_date = records
                    .iter()
                    .filter(|r| r.currency == record.currency)
                    .map(|r| r.date)
                    .max()
                    .unwrap();
                prop_assert_eq!(record.date, max_date);
            }

            let distinct: std::collections::BTreeSet<&Currency> =
                records.iter().map(|r| &r.currency).collect();
            prop_assert_eq!(catalog.len(), distinct.len());
        }
    }
}
