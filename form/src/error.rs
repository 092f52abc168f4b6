//! Controller error types.

use swapform_common::{SwapFormError, ValidationError};
use thiserror::Error;

use crate::state::FormState;

/// Errors returned by form event handlers.
#[derive(Debug, Clone, Error)]
pub enum FormError {
    /// Catalogs have not finished loading.
    #[error("Form is not ready ({0})")]
    NotReady(FormState),

    /// A swap is being submitted.
    #[error("A swap is already being submitted")]
    Busy,

    /// Invalid state transition.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: FormState, to: FormState },

    /// Input does not describe a valid swap.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Loading or submission failed.
    #[error(transparent)]
    Swap(#[from] SwapFormError),
}

/// Result type for form operations.
pub type FormResult<T> = Result<T, FormError>;
