//! Form lifecycle state machine and derived view flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the swap form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormState {
    /// Constructed, nothing loaded.
    Uninitialized,
    /// Fetching the price catalog and wallet currencies.
    LoadingCatalogs,
    /// Accepting input.
    Ready,
    /// A swap is being submitted; input is locked.
    Submitting,
}

impl FormState {
    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[FormState] {
        match self {
            FormState::Uninitialized => &[FormState::LoadingCatalogs],
            FormState::LoadingCatalogs => &[FormState::Ready],
            FormState::Ready => &[FormState::Submitting],
            FormState::Submitting => &[FormState::Ready],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: FormState) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Whether user input may change the form.
    pub fn accepts_input(&self) -> bool {
        matches!(self, FormState::Ready)
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormState::Uninitialized => "uninitialized",
            FormState::LoadingCatalogs => "loading",
            FormState::Ready => "ready",
            FormState::Submitting => "submitting",
        };
        write!(f, "{}", name)
    }
}

/// Which controls the presentation layer should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub state: FormState,
    /// Source currency selector.
    pub input_selector_enabled: bool,
    /// Amount entry; needs a source currency first.
    pub amount_enabled: bool,
    /// Target currency selector; needs a source currency first.
    pub output_selector_enabled: bool,
    /// MAX action; needs a positive wallet balance.
    pub max_enabled: bool,
    /// Confirm action; needs a valid quote.
    pub submit_enabled: bool,
}

impl FormView {
    /// Derive the view for a state and the current selection.
    pub fn derive(
        state: FormState,
        has_input_currency: bool,
        has_wallet_balance: bool,
        quote_valid: bool,
    ) -> Self {
        let ready = state.accepts_input();
        Self {
            state,
            input_selector_enabled: ready,
            amount_enabled: ready && has_input_currency,
            output_selector_enabled: ready && has_input_currency,
            max_enabled: ready && has_input_currency && has_wallet_balance,
            submit_enabled: ready && quote_valid,
        }
    }
}
