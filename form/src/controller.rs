//! Swap form controller.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use swapform_common::{
    parse_amount, Currency, PriceRecord, SwapFormError, SwapQuote, SwapReceipt, ValidationError,
};
use swapform_pricing::{
    find_wallet_currency, validate, PriceCatalog, PriceRepository, SwapCalculator,
    WalletCurrency, WalletCurrencyResolver, WalletSource,
};

use crate::config::FormConfig;
use crate::error::{FormError, FormResult};
use crate::executor::SwapExecutor;
use crate::presenter::{Advisory, FormPresenter};
use crate::state::{FormState, FormView};

/// Shown when submit is requested for an invalid quote.
pub const SUBMIT_VALIDATION_MESSAGE: &str =
    "Please select different currencies and enter a valid amount.";

/// Which currency selector an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencySlot {
    /// Currency being sent; chosen from wallet currencies.
    Input,
    /// Currency being received; chosen from the full catalog.
    Output,
}

/// Mutable form data, guarded by the controller's lock.
struct FormData {
    state: FormState,
    wallet: Arc<Vec<WalletCurrency>>,
    catalog: Arc<PriceCatalog>,
    input_amount: Decimal,
    input_currency: Option<Currency>,
    output_currency: Option<Currency>,
    quote: SwapQuote,
    load_error: Option<SwapFormError>,
}

impl FormData {
    fn new() -> Self {
        Self {
            state: FormState::Uninitialized,
            wallet: Arc::new(Vec::new()),
            catalog: Arc::new(PriceCatalog::new()),
            input_amount: Decimal::ZERO,
            input_currency: None,
            output_currency: None,
            quote: SwapQuote::empty(),
            load_error: None,
        }
    }

    fn transition_to(&mut self, next: FormState) -> FormResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(FormError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(from = %self.state, to = %next, "Form state transition");
        self.state = next;
        Ok(())
    }

    fn ensure_accepts_input(&self) -> FormResult<()> {
        match self.state {
            FormState::Ready => Ok(()),
            FormState::Submitting => Err(FormError::Busy),
            other => Err(FormError::NotReady(other)),
        }
    }

    fn view(&self) -> FormView {
        let has_balance = self
            .input_currency
            .as_ref()
            .and_then(|c| find_wallet_currency(&self.wallet, c))
            .map(WalletCurrency::has_balance)
            .unwrap_or(false);

        FormView::derive(
            self.state,
            self.input_currency.is_some(),
            has_balance,
            self.quote.valid,
        )
    }

    fn reset_inputs(&mut self) {
        self.input_amount = Decimal::ZERO;
        self.input_currency = None;
        self.output_currency = None;
        self.quote = SwapQuote::empty();
    }
}

/// What a handler needs the presenter to show once the lock is released.
struct QuoteUpdate {
    quote: SwapQuote,
    view: FormView,
    advisory: Option<Advisory>,
}

/// Orchestrates the swap form.
///
/// Event handlers take `&self`; derived state is recomputed synchronously
/// under a short-lived lock and pushed to the presenter afterwards. Only
/// `initialize` and `submit` suspend.
pub struct SwapFormController {
    config: FormConfig,
    prices: Arc<PriceRepository>,
    resolver: WalletCurrencyResolver,
    executor: Arc<dyn SwapExecutor>,
    presenter: Arc<dyn FormPresenter>,
    calculator: SwapCalculator,
    data: Mutex<FormData>,
}

impl SwapFormController {
    /// Create an uninitialized controller.
    pub fn new(
        config: FormConfig,
        prices: Arc<PriceRepository>,
        wallet: Arc<dyn WalletSource>,
        executor: Arc<dyn SwapExecutor>,
        presenter: Arc<dyn FormPresenter>,
    ) -> Self {
        let calculator = SwapCalculator::new(config.output_decimal_places);
        let resolver = WalletCurrencyResolver::new(wallet, Arc::clone(&prices));

        Self {
            config,
            prices,
            resolver,
            executor,
            presenter,
            calculator,
            data: Mutex::new(FormData::new()),
        }
    }

    /// Create a controller and load its catalogs.
    pub async fn start(
        config: FormConfig,
        prices: Arc<PriceRepository>,
        wallet: Arc<dyn WalletSource>,
        executor: Arc<dyn SwapExecutor>,
        presenter: Arc<dyn FormPresenter>,
    ) -> Self {
        let controller = Self::new(config, prices, wallet, executor, presenter);
        controller.initialize().await;
        controller
    }

    /// Load the price catalog and wallet currencies, then become ready.
    ///
    /// Load failures leave the form ready but empty; they are reported to the
    /// presenter once and never returned.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let started = self.data.lock().transition_to(FormState::LoadingCatalogs);
        if let Err(e) = started {
            warn!(error = %e, "Form already initialized");
            return;
        }
        self.presenter.state_changed(FormState::LoadingCatalogs);

        let (catalog, wallet) = tokio::join!(self.prices.get_catalog(), self.resolver.resolve());

        let loaded = match (catalog, wallet) {
            (Ok(catalog), Ok(wallet)) => Ok((catalog, wallet)),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        };

        let (source, target, error, view) = {
            let mut data = self.data.lock();
            let error = match loaded {
                Ok((catalog, wallet)) => {
                    data.catalog = catalog;
                    data.wallet = Arc::new(wallet);
                    None
                }
                Err(e) => {
                    data.catalog = Arc::new(PriceCatalog::new());
                    data.wallet = Arc::new(Vec::new());
                    data.load_error = Some(e.clone());
                    Some(e)
                }
            };
            data.reset_inputs();
            if let Err(e) = data.transition_to(FormState::Ready) {
                warn!(error = %e, "Unexpected state after loading");
            }
            (
                Arc::clone(&data.wallet),
                data.catalog.records(),
                error,
                data.view(),
            )
        };

        self.presenter.state_changed(FormState::Ready);
        match &error {
            None => info!(
                source = source.len(),
                target = target.len(),
                "Swap form ready"
            ),
            Some(e) => {
                warn!(error = %e, "Swap form ready without currency data");
                self.presenter.load_failed(e);
            }
        }
        self.presenter.currencies_loaded(&source, &target);
        self.presenter.quote_updated(&SwapQuote::empty(), &view);
    }

    /// Amount text changed.
    pub fn set_amount_text(&self, text: &str) -> FormResult<SwapQuote> {
        self.set_amount(parse_amount(text))
    }

    /// Amount changed.
    pub fn set_amount(&self, amount: Decimal) -> FormResult<SwapQuote> {
        self.mutate(|data| {
            data.input_amount = amount;
            Ok(())
        })
    }

    /// A currency was picked in one of the selectors. An empty symbol clears it.
    pub fn select_currency(
        &self,
        slot: CurrencySlot,
        currency: impl Into<Currency>,
    ) -> FormResult<SwapQuote> {
        let currency = currency.into();
        if currency.is_empty() {
            return self.clear_currency(slot);
        }

        self.mutate(|data| {
            let known = match slot {
                CurrencySlot::Input => find_wallet_currency(&data.wallet, &currency).is_some(),
                CurrencySlot::Output => data.catalog.contains(&currency),
            };
            if !known {
                return Err(ValidationError::UnknownCurrency(currency.clone()).into());
            }

            match slot {
                CurrencySlot::Input => data.input_currency = Some(currency.clone()),
                CurrencySlot::Output => data.output_currency = Some(currency.clone()),
            }
            Ok(())
        })
    }

    /// A selector was reset.
    pub fn clear_currency(&self, slot: CurrencySlot) -> FormResult<SwapQuote> {
        self.mutate(|data| {
            match slot {
                CurrencySlot::Input => data.input_currency = None,
                CurrencySlot::Output => data.output_currency = None,
            }
            Ok(())
        })
    }

    /// Set the amount to the full wallet balance of the input currency.
    pub fn set_max_amount(&self) -> FormResult<Decimal> {
        let balance = {
            let data = self.data.lock();
            data.ensure_accepts_input()?;

            let currency = data
                .input_currency
                .clone()
                .ok_or(ValidationError::CurrencyNotSelected)?;
            let balance = find_wallet_currency(&data.wallet, &currency)
                .map(WalletCurrency::wallet_amount)
                .unwrap_or(Decimal::ZERO);
            if balance <= Decimal::ZERO {
                return Err(ValidationError::NoWalletBalance(currency).into());
            }
            balance
        };

        self.set_amount(balance)?;
        Ok(balance)
    }

    /// Submit the current quote.
    ///
    /// Success resets the form; failure keeps the inputs so the user can retry.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> FormResult<SwapReceipt> {
        let (quote, view) = {
            let mut data = self.data.lock();
            data.ensure_accepts_input()?;

            let quote = self.recompute(&mut data);
            if let Err(reason) = validate(&quote) {
                drop(data);
                let advisory = Advisory::new(SUBMIT_VALIDATION_MESSAGE, self.config.advisory_ttl);
                self.presenter.validation_failed(&reason, &advisory);
                return Err(reason.into());
            }

            data.transition_to(FormState::Submitting)?;
            (quote, data.view())
        };

        self.presenter.state_changed(FormState::Submitting);
        self.presenter.quote_updated(&quote, &view);

        let result = self.executor.submit_swap(&quote).await;

        let (quote, view) = {
            let mut data = self.data.lock();
            if result.is_ok() {
                data.reset_inputs();
            }
            data.transition_to(FormState::Ready)?;
            (data.quote.clone(), data.view())
        };

        self.presenter.state_changed(FormState::Ready);
        self.presenter.quote_updated(&quote, &view);

        match result {
            Ok(receipt) => {
                info!(swap_id = %receipt.id, "{}", receipt.summary());
                self.presenter.swap_completed(&receipt);
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Swap submission failed");
                self.presenter.submit_failed(&e);
                Err(e.into())
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FormState {
        self.data.lock().state
    }

    /// Current quote.
    pub fn quote(&self) -> SwapQuote {
        self.data.lock().quote.clone()
    }

    /// Current control flags.
    pub fn view(&self) -> FormView {
        self.data.lock().view()
    }

    /// Choices for the source selector.
    pub fn source_currencies(&self) -> Arc<Vec<WalletCurrency>> {
        Arc::clone(&self.data.lock().wallet)
    }

    /// Choices for the target selector.
    pub fn target_currencies(&self) -> Vec<PriceRecord> {
        self.data.lock().catalog.records()
    }

    /// Error from startup loading, if any.
    pub fn load_error(&self) -> Option<SwapFormError> {
        self.data.lock().load_error.clone()
    }

    fn recompute(&self, data: &mut FormData) -> SwapQuote {
        data.quote = self.calculator.quote(
            data.input_amount,
            data.input_currency.as_ref(),
            data.output_currency.as_ref(),
            &data.wallet,
            &data.catalog,
        );
        data.quote.clone()
    }

    /// Apply an input change, recompute, then notify outside the lock.
    fn mutate(
        &self,
        apply: impl FnOnce(&mut FormData) -> FormResult<()>,
    ) -> FormResult<SwapQuote> {
        let update = {
            let mut data = self.data.lock();
            data.ensure_accepts_input()?;
            apply(&mut data)?;

            let quote = self.recompute(&mut data);
            let advisory = quote.is_same_currency().then(|| {
                Advisory::new(
                    ValidationError::SameCurrency.to_string(),
                    self.config.advisory_ttl,
                )
            });
            QuoteUpdate {
                quote,
                view: data.view(),
                advisory,
            }
        };

        if let Some(advisory) = &update.advisory {
            self.presenter.advisory(advisory);
        }
        self.presenter.quote_updated(&update.quote, &update.view);
        Ok(update.quote)
    }
}
