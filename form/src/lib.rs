//! SwapForm Controller
//!
//! Drives the currency swap form: loads the price catalog and wallet
//! currencies, recomputes the quote on every input change, and submits swaps
//! through a pluggable executor. Rendering is delegated to a [`FormPresenter`].

pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod presenter;
pub mod state;

pub use config::FormConfig;
pub use controller::{CurrencySlot, SwapFormController};
pub use error::FormError;
pub use executor::{SimulatedExecutor, SwapExecutor};
pub use presenter::{Advisory, FormPresenter, LoggingPresenter};
pub use state::{FormState, FormView};

#[cfg(any(test, feature = "test-utils"))]
pub use executor::MockExecutor;
#[cfg(any(test, feature = "test-utils"))]
pub use presenter::{PresenterEvent, RecordingPresenter};
