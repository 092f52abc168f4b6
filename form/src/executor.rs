//! Swap submission.

use async_trait::async_trait;
use std::time::Duration;
use swapform_common::{Result, SwapQuote, SwapReceipt};
use tracing::{info, instrument};

/// Performs a swap for a validated quote.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn submit_swap(&self, quote: &SwapQuote) -> Result<SwapReceipt>;
}

/// Executor that waits for a fixed latency and always succeeds.
///
/// No funds move; this stands in for a settlement backend.
pub struct SimulatedExecutor {
    latency: Duration,
}

impl SimulatedExecutor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl SwapExecutor for SimulatedExecutor {
    #[instrument(skip(self, quote), fields(latency_ms = self.latency.as_millis() as u64))]
    async fn submit_swap(&self, quote: &SwapQuote) -> Result<SwapReceipt> {
        tokio::time::sleep(self.latency).await;

        let receipt = SwapReceipt::new(quote.clone());
        info!(swap_id = %receipt.id, "Simulated swap executed");
        Ok(receipt)
    }
}

/// Mock executor for testing: can fail, and can hold each submission until released.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockExecutor {
    error: parking_lot::Mutex<Option<swapform_common::SwapFormError>>,
    gate: Option<std::sync::Arc<tokio::sync::Semaphore>>,
    submitted: parking_lot::Mutex<Vec<SwapQuote>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockExecutor {
    /// Executor that succeeds immediately.
    pub fn new() -> Self {
        Self {
            error: parking_lot::Mutex::new(None),
            gate: None,
            submitted: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Hold each submission until a permit is added to `gate`.
    pub fn gated(gate: std::sync::Arc<tokio::sync::Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    /// Fail every submission with `error`.
    pub fn fail_with(&self, error: swapform_common::SwapFormError) {
        *self.error.lock() = Some(error);
    }

    pub fn submitted(&self) -> Vec<SwapQuote> {
        self.submitted.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl SwapExecutor for MockExecutor {
    async fn submit_swap(&self, quote: &SwapQuote) -> Result<SwapReceipt> {
        self.submitted.lock().push(quote.clone());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match self.error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(SwapReceipt::new(quote.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use swapform_common::{Currency, OutputAmount};

    #[tokio::test]
    async fn test_simulated_executor_returns_receipt() {
        let executor = SimulatedExecutor::new(Duration::from_millis(5));
        let quote = SwapQuote {
            input_amount: dec!(1),
            input_currency: Some(Currency::new("ETH")),
            output_amount: OutputAmount::Amount(dec!(2500)),
            output_currency: Some(Currency::new("USDC")),
            valid: true,
        };

        let receipt = executor.submit_swap(&quote).await.unwrap();

        assert_eq!(receipt.quote, quote);
    }
}
