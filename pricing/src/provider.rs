//! Price feed and wallet source traits and implementations.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use swapform_common::{PriceRecord, Result, SwapFormError, WalletEnvelope, WalletPayload};
use tracing::debug;

/// Source of raw price observations.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Get the feed name.
    fn name(&self) -> &str;

    /// Fetch every price record the feed publishes, duplicates included.
    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>>;
}

/// Source of the current user's wallet holdings.
#[async_trait]
pub trait WalletSource: Send + Sync {
    /// Fetch the wallet payload.
    async fn fetch_wallet(&self) -> Result<WalletPayload>;
}

/// Price feed backed by a JSON array of price records on disk.
pub struct JsonFilePriceFeed {
    path: PathBuf,
}

impl JsonFilePriceFeed {
    /// Create a feed reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriceFeed for JsonFilePriceFeed {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>> {
        let bytes = read_file(&self.path).await?;
        let records: Vec<PriceRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            SwapFormError::Fetch(format!("parsing {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), records = records.len(), "Read price feed");
        Ok(records)
    }
}

/// Wallet source backed by a `{"success": .., "data": ..}` JSON document on disk.
pub struct JsonFileWalletSource {
    path: PathBuf,
}

impl JsonFileWalletSource {
    /// Create a wallet source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WalletSource for JsonFileWalletSource {
    async fn fetch_wallet(&self) -> Result<WalletPayload> {
        let bytes = read_file(&self.path).await?;
        let envelope: WalletEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
            SwapFormError::Fetch(format!("parsing {}: {}", self.path.display(), e))
        })?;

        envelope.into_payload()
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SwapFormError::Fetch(format!("reading {}: {}", path.display(), e)))
}

/// Mock price feed for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockPriceFeed {
    records: parking_lot::Mutex<Vec<PriceRecord>>,
    calls: std::sync::atomic::AtomicUsize,
    failures: std::sync::atomic::AtomicUsize,
    delay: Option<std::time::Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockPriceFeed {
    /// Create a mock feed publishing `records`.
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self {
            records: parking_lot::Mutex::new(records),
            calls: std::sync::atomic::AtomicUsize::new(0),
            failures: std::sync::atomic::AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Suspend every fetch for `delay` before answering.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the next `count` fetches.
    pub fn fail_next(&self, count: usize) {
        self.failures
            .store(count, std::sync::atomic::Ordering::SeqCst);
    }

    /// Replace the published records.
    pub fn set_records(&self, records: Vec<PriceRecord>) {
        *self.records.lock() = records;
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PriceFeed for MockPriceFeed {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>> {
        use std::sync::atomic::Ordering;

        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SwapFormError::Fetch("mock price feed unavailable".to_string()));
        }

        Ok(self.records.lock().clone())
    }
}

/// Mock wallet source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockWalletSource {
    response: parking_lot::Mutex<Result<WalletPayload>>,
    calls: std::sync::atomic::AtomicUsize,
    delay: Option<std::time::Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockWalletSource {
    /// Create a mock source returning `payload`.
    pub fn new(payload: WalletPayload) -> Self {
        Self {
            response: parking_lot::Mutex::new(Ok(payload)),
            calls: std::sync::atomic::AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Create a mock source that always fails with `error`.
    pub fn failing(error: SwapFormError) -> Self {
        Self {
            response: parking_lot::Mutex::new(Err(error)),
            calls: std::sync::atomic::AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Suspend every fetch for `delay` before answering.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl WalletSource for MockWalletSource {
    async fn fetch_wallet(&self) -> Result<WalletPayload> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.lock().clone()
    }
}
