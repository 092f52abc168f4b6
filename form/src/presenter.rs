//! Presentation layer seam.

use std::time::Duration;

use swapform_common::{PriceRecord, SwapFormError, SwapQuote, SwapReceipt, ValidationError};
use swapform_pricing::WalletCurrency;

use crate::state::{FormState, FormView};

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub message: String,
    /// How long the presentation layer should keep it visible.
    pub ttl: Duration,
}

impl Advisory {
    pub fn new(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            ttl,
        }
    }
}

/// Receives everything the form wants rendered.
///
/// Callbacks are invoked after the controller has released its own lock, so
/// an implementation may call back into the controller.
pub trait FormPresenter: Send + Sync {
    /// The lifecycle state changed.
    fn state_changed(&self, state: FormState);

    /// Currency choices for the source and target selectors.
    fn currencies_loaded(&self, source: &[WalletCurrency], target: &[PriceRecord]);

    /// The quote or the enabled controls changed.
    fn quote_updated(&self, quote: &SwapQuote, view: &FormView);

    /// Show a transient advisory.
    fn advisory(&self, advisory: &Advisory);

    /// Startup loading failed; the form is empty.
    fn load_failed(&self, error: &SwapFormError);

    /// Submit was requested for an invalid quote.
    fn validation_failed(&self, reason: &ValidationError, advisory: &Advisory);

    /// Submission failed; inputs are preserved.
    fn submit_failed(&self, error: &SwapFormError);

    /// Submission succeeded; the form has been reset.
    fn swap_completed(&self, receipt: &SwapReceipt);
}

/// Presenter that only logs.
pub struct LoggingPresenter;

impl FormPresenter for LoggingPresenter {
    fn state_changed(&self, state: FormState) {
        tracing::debug!(state = %state, "Form state changed");
    }

    fn currencies_loaded(&self, source: &[WalletCurrency], target: &[PriceRecord]) {
        tracing::info!(
            source = source.len(),
            target = target.len(),
            "Currency choices loaded"
        );
    }

    fn quote_updated(&self, quote: &SwapQuote, view: &FormView) {
        tracing::info!(
            input_amount = %quote.input_amount,
            input_currency = ?quote.input_currency.as_ref().map(|c| c.symbol()),
            output_amount = %quote.output_amount,
            output_currency = ?quote.output_currency.as_ref().map(|c| c.symbol()),
            valid = quote.valid,
            submit_enabled = view.submit_enabled,
            "Quote updated"
        );
    }

    fn advisory(&self, advisory: &Advisory) {
        tracing::info!(message = %advisory.message, "Advisory");
    }

    fn load_failed(&self, error: &SwapFormError) {
        tracing::warn!(error = %error, code = error.error_code(), "Failed to load currency data");
    }

    fn validation_failed(&self, reason: &ValidationError, advisory: &Advisory) {
        tracing::warn!(reason = %reason, message = %advisory.message, "Swap rejected");
    }

    fn submit_failed(&self, error: &SwapFormError) {
        tracing::warn!(error = %error, "Swap submission failed");
    }

    fn swap_completed(&self, receipt: &SwapReceipt) {
        tracing::info!(swap_id = %receipt.id, "{}", receipt.summary());
    }
}

/// Everything a [`RecordingPresenter`] has seen.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum PresenterEvent {
    StateChanged(FormState),
    CurrenciesLoaded { source: Vec<String>, target: Vec<String> },
    QuoteUpdated(SwapQuote, FormView),
    Advisory(Advisory),
    LoadFailed(SwapFormError),
    ValidationFailed(ValidationError),
    SubmitFailed(SwapFormError),
    SwapCompleted(SwapReceipt),
}

/// Presenter that records every callback for assertions.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct RecordingPresenter {
    events: parking_lot::Mutex<Vec<PresenterEvent>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().clone()
    }

    pub fn advisories(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Advisory(a) => Some(a.message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_quote(&self) -> Option<(SwapQuote, FormView)> {
        self.events.lock().iter().rev().find_map(|e| match e {
            PresenterEvent::QuoteUpdated(q, v) => Some((q.clone(), *v)),
            _ => None,
        })
    }

    pub fn count(&self, matches: impl Fn(&PresenterEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| matches(e)).count()
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl FormPresenter for RecordingPresenter {
    fn state_changed(&self, state: FormState) {
        self.push(PresenterEvent::StateChanged(state));
    }

    fn currencies_loaded(&self, source: &[WalletCurrency], target: &[PriceRecord]) {
        self.push(PresenterEvent::CurrenciesLoaded {
            source: source.iter().map(|w| w.currency().to_string()).collect(),
            target: target.iter().map(|r| r.currency.to_string()).collect(),
        });
    }

    fn quote_updated(&self, quote: &SwapQuote, view: &FormView) {
        self.push(PresenterEvent::QuoteUpdated(quote.clone(), *view));
    }

    fn advisory(&self, advisory: &Advisory) {
        self.push(PresenterEvent::Advisory(advisory.clone()));
    }

    fn load_failed(&self, error: &SwapFormError) {
        self.push(PresenterEvent::LoadFailed(error.clone()));
    }

    fn validation_failed(&self, reason: &ValidationError, _advisory: &Advisory) {
        self.push(PresenterEvent::ValidationFailed(reason.clone()));
    }

    fn submit_failed(&self, error: &SwapFormError) {
        self.push(PresenterEvent::SubmitFailed(error.clone()));
    }

    fn swap_completed(&self, receipt: &SwapReceipt) {
        self.push(PresenterEvent::SwapCompleted(receipt.clone()));
    }
}
