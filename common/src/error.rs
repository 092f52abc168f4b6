//! Error types for SwapForm.

use crate::monetary::Currency;
use thiserror::Error;

/// Main error type for SwapForm operations.
///
/// Cloneable so a single failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapFormError {
    /// Network or parse failure while fetching prices or wallet data.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Payload was fetched but is structurally invalid.
    #[error("Invalid data: {0}")]
    Data(String),

    /// User input does not describe a valid swap.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Swap submission failed.
    #[error("Swap submission failed: {0}")]
    Submit(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SwapFormError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SwapFormError::Fetch(_) | SwapFormError::Submit(_))
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            SwapFormError::Fetch(_) => "FETCH_ERROR",
            SwapFormError::Data(_) => "DATA_ERROR",
            SwapFormError::Validation(_) => "VALIDATION_ERROR",
            SwapFormError::Submit(_) => "SUBMIT_ERROR",
            SwapFormError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// User-facing validation failures. The display text is shown as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid amount greater than 0")]
    InvalidAmount,

    #[error("Please select both currencies")]
    CurrencyNotSelected,

    #[error("Cannot swap to the same currency")]
    SameCurrency,

    #[error("No price available for {0}")]
    PriceUnavailable(Currency),

    #[error("Unknown currency {0}")]
    UnknownCurrency(Currency),

    #[error("No wallet balance for {0}")]
    NoWalletBalance(Currency),
}

/// Result type alias for SwapForm operations.
pub type Result<T> = std::result::Result<T, SwapFormError>;
