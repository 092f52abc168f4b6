//! SwapForm Pricing
//!
//! Exchange-rate data for the swap form: the price feed and wallet source
//! seams, the deduplicated price catalog, the single-flight catalog cache,
//! wallet currency resolution and the swap amount calculator.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swapform_pricing::{JsonFilePriceFeed, PriceRepository};
//!
//! let feed = Arc::new(JsonFilePriceFeed::new("prices.json"));
//! let repository = Arc::new(PriceRepository::new(feed));
//!
//! // Concurrent callers share one fetch
//! let catalog = repository.get_catalog().await?;
//! ```

pub mod provider;
pub mod catalog;
pub mod cache;
pub mod wallet;
pub mod conversion;

pub use provider::{JsonFilePriceFeed, JsonFileWalletSource, PriceFeed, WalletSource};
pub use catalog::PriceCatalog;
pub use cache::{PriceRepository, RepositoryStats, SharedPriceRepository};
pub use wallet::{find_wallet_currency, WalletCurrency, WalletCurrencyResolver};
pub use conversion::{is_swap_valid, validate, SwapCalculator};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::{MockPriceFeed, MockWalletSource};
