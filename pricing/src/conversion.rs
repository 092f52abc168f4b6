//! Swap amount calculation and validation.

use rust_decimal::Decimal;
use swapform_common::{
    round_amount, Currency, OutputAmount, SwapQuote, ValidationError, OUTPUT_DECIMAL_PLACES,
};

use crate::catalog::PriceCatalog;
use crate::wallet::{find_wallet_currency, WalletCurrency};

/// Direct-rate swap calculator. Holds no state beyond its rounding precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapCalculator {
    decimal_places: u32,
}

impl SwapCalculator {
    /// Create a calculator rounding outputs to `decimal_places`.
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Compute the amount of `output_currency` received for `input_amount`.
    ///
    /// The input side is priced from the wallet entry, the output side from
    /// the full catalog.
    pub fn compute_output(
        &self,
        input_amount: Decimal,
        input_currency: Option<&Currency>,
        output_currency: Option<&Currency>,
        wallet: &[WalletCurrency],
        catalog: &PriceCatalog,
    ) -> OutputAmount {
        let (Some(input), Some(output)) = (input_currency, output_currency) else {
            return OutputAmount::Unavailable;
        };
        if input_amount <= Decimal::ZERO {
            return OutputAmount::Unavailable;
        }

        let input_price = find_wallet_currency(wallet, input)
            .map(WalletCurrency::price)
            .unwrap_or(Decimal::ZERO);
        let output_price = catalog.price_of(output).unwrap_or(Decimal::ZERO);
        if input_price <= Decimal::ZERO || output_price <= Decimal::ZERO {
            return OutputAmount::Unavailable;
        }

        match input_amount
            .checked_mul(input_price)
            .and_then(|value| value.checked_div(output_price))
        {
            Some(value) => OutputAmount::Amount(round_amount(value, self.decimal_places)),
            None => OutputAmount::Unavailable,
        }
    }

    /// Build a quote for the current inputs with validity filled in.
    pub fn quote(
        &self,
        input_amount: Decimal,
        input_currency: Option<&Currency>,
        output_currency: Option<&Currency>,
        wallet: &[WalletCurrency],
        catalog: &PriceCatalog,
    ) -> SwapQuote {
        let mut quote = SwapQuote {
            input_amount,
            input_currency: input_currency.cloned(),
            output_amount: self.compute_output(
                input_amount,
                input_currency,
                output_currency,
                wallet,
                catalog,
            ),
            output_currency: output_currency.cloned(),
            valid: false,
        };
        quote.valid = is_swap_valid(&quote);
        quote
    }
}

impl Default for SwapCalculator {
    fn default() -> Self {
        Self::new(OUTPUT_DECIMAL_PLACES)
    }
}

/// First rule the quote breaks, if any.
pub fn validate(quote: &SwapQuote) -> Result<(), ValidationError> {
    let (Some(input), Some(output)) = (&quote.input_currency, &quote.output_currency) else {
        return Err(ValidationError::CurrencyNotSelected);
    };
    if input == output {
        return Err(ValidationError::SameCurrency);
    }
    if quote.input_amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount);
    }
    if quote.output_amount.value() <= Decimal::ZERO {
        return Err(ValidationError::PriceUnavailable(output.clone()));
    }
    Ok(())
}

/// Whether the quote may be submitted.
pub fn is_swap_valid(quote: &SwapQuote) -> bool {
    validate(quote).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::intersect_holdings;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use swapform_common::{Holding, PriceRecord, WalletPayload};

    fn fixture(prices: &[(&str, Decimal)], holdings: &[(&str, Decimal)]) -> (Vec<WalletCurrency>, PriceCatalog) {
        let now = Utc::now();
        let catalog = PriceCatalog::from_records(
            prices.iter().map(|(c, p)| PriceRecord::new(*c, now, *p)),
        );
        let payload = WalletPayload::with_holdings(
            holdings
                .iter()
                .map(|(c, a)| Holding::new(*c, *a, Decimal::ZERO))
                .collect(),
        );
        let wallet = intersect_holdings(&payload, &catalog).unwrap();
        (wallet, catalog)
    }

    fn usd() -> Currency {
        Currency::new("USD")
    }

    fn eur() -> Currency {
        Currency::new("EUR")
    }

    #[test]
    fn test_compute_output_rounds_to_six_places() {
        let (wallet, catalog) = fixture(&[("USD", dec!(1)), ("EUR", dec!(0.9))], &[("USD", dec!(500))]);
        let calc = SwapCalculator::default();

        let output = calc.compute_output(dec!(100), Some(&usd()), Some(&eur()), &wallet, &catalog);

        assert_eq!(output, OutputAmount::Amount(dec!(111.111111)));
    }

    #[test]
    fn test_compute_output_unavailable_cases() {
        let (wallet, catalog) = fixture(
            &[("USD", dec!(1)), ("EUR", dec!(0.9)), ("ZERO", dec!(0))],
            &[("USD", dec!(500)), ("ZERO", dec!(1))],
        );
        let calc = SwapCalculator::default();
        let zero = Currency::new("ZERO");
        let unknown = Currency::new("XYZ");

        assert_eq!(calc.compute_output(dec!(0), Some(&usd()), Some(&eur()), &wallet, &catalog), OutputAmount::Unavailable);
        assert_eq!(calc.compute_output(dec!(-1), Some(&usd()), Some(&eur()), &wallet, &catalog), OutputAmount::Unavailable);
        assert_eq!(calc.compute_output(dec!(10), None, Some(&eur()), &wallet, &catalog), OutputAmount::Unavailable);
        assert_eq!(calc.compute_output(dec!(10), Some(&usd()), None, &wallet, &catalog), OutputAmount::Unavailable);
        assert_eq!(calc.compute_output(dec!(10), Some(&usd()), Some(&unknown), &wallet, &catalog), OutputAmount::Unavailable);
        assert_eq!(calc.compute_output(dec!(10), Some(&zero), Some(&usd()), &wallet, &catalog), OutputAmount::Unavailable);
        assert_eq!(calc.compute_output(dec!(10), Some(&usd()), Some(&zero), &wallet, &catalog), OutputAmount::Unavailable);
        // EUR is priced but not held, so it has no wallet-side rate.
        assert_eq!(calc.compute_output(dec!(10), Some(&eur()), Some(&usd()), &wallet, &catalog), OutputAmount::Unavailable);
    }

    #[test]
    fn test_quote_btc_to_eth() {
        let (wallet, catalog) = fixture(&[("BTC", dec!(50000)), ("ETH", dec!(2500))], &[("BTC", dec!(0.5))]);
        let btc = Currency::new("BTC");
        let eth = Currency::new("ETH");

        let quote = SwapCalculator::default().quote(dec!(0.5), Some(&btc), Some(&eth), &wallet, &catalog);

        assert_eq!(quote.output_amount, OutputAmount::Amount(dec!(10.0)));
        assert!(quote.valid);
    }

    #[test]
    fn test_same_currency_is_invalid() {
        let (wallet, catalog) = fixture(&[("BTC", dec!(50000))], &[("BTC", dec!(0.5))]);
        let btc = Currency::new("BTC");

        let quote = SwapCalculator::default().quote(dec!(0.5), Some(&btc), Some(&btc), &wallet, &catalog);

        assert!(!quote.valid);
        assert_eq!(validate(&quote), Err(ValidationError::SameCurrency));
    }

    #[test]
    fn test_validate_reasons() {
        let mut quote = SwapQuote::empty();
        assert_eq!(validate(&quote), Err(ValidationError::CurrencyNotSelected));

        quote.input_currency = Some(usd());
        quote.output_currency = Some(eur());
        assert_eq!(validate(&quote), Err(ValidationError::InvalidAmount));

        quote.input_amount = dec!(5);
        assert_eq!(validate(&quote), Err(ValidationError::PriceUnavailable(eur())));

        quote.output_amount = OutputAmount::Amount(dec!(4.5));
        assert!(is_swap_valid(&quote));
    }

    proptest! {
        #[test]
        fn prop_compute_output_is_pure(
            amount in 0u64..10_000_000,
            input_price in 1u64..1_000_000,
            output_price in 1u64..1_000_000,
        ) {
            let (wallet, catalog) = fixture(
                &[("AAA", Decimal::from(input_price)), ("BBB", Decimal::new(output_price as i64, 3))],
                &[("AAA", dec!(1))],
            );
            let calc = SwapCalculator::default();
            let amount = Decimal::new(amount as i64, 4);
            let a = Currency::new("AAA");
            let b = Currency::new("BBB");

            let first = calc.compute_output(amount, Some(&a), Some(&b), &wallet, &catalog);
            let second = calc.compute_output(amount, Some(&a), Some(&b), &wallet, &catalog);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_same_currency_never_valid(amount in 0i64..1_000_000, output in 0i64..1_000_000) {
            let quote = SwapQuote {
                input_amount: Decimal::new(amount, 2),
                input_currency: Some(Currency::new("BTC")),
                output_amount: OutputAmount::Amount(Decimal::new(output, 2)),
                output_currency: Some(Currency::new("BTC")),
                valid: false,
            };
            prop_assert!(!is_swap_valid(&quote));
        }
    }
}
