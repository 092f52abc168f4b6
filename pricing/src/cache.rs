//! Process-wide price catalog cache with single-flight loading.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use swapform_common::{Result, SwapFormError};
use tracing::{debug, info, instrument, warn};

use crate::catalog::PriceCatalog;
use crate::provider::PriceFeed;

type CatalogFetch = Shared<BoxFuture<'static, Result<Arc<PriceCatalog>>>>;

/// Cache slot. Exactly one variant holds at any time.
enum CatalogSlot {
    /// Nothing fetched yet.
    Empty,
    /// A fetch is in flight; callers clone and await the handle.
    Pending(CatalogFetch),
    /// Catalog loaded; immutable for the life of the repository.
    Ready(Arc<PriceCatalog>),
    /// Last fetch failed; the next caller starts a new one.
    Failed(SwapFormError),
}

#[derive(Debug, Default)]
struct Counters {
    fetches: AtomicU64,
    hits: AtomicU64,
    joins: AtomicU64,
}

/// Owner of the price catalog.
///
/// The first caller starts the fetch, callers arriving while it is in flight
/// await the same fetch, and later callers get the cached catalog. At most one
/// fetch is outstanding at any time.
pub struct PriceRepository {
    feed: Arc<dyn PriceFeed>,
    slot: Arc<Mutex<CatalogSlot>>,
    counters: Arc<Counters>,
}

impl PriceRepository {
    /// Create a cold repository over a price feed.
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self {
            feed,
            slot: Arc::new(Mutex::new(CatalogSlot::Empty)),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Get the catalog, fetching it on first use.
    #[instrument(skip(self), fields(feed = self.feed.name()))]
    pub async fn get_catalog(&self) -> Result<Arc<PriceCatalog>> {
        // Check-and-set must not span an await.
        let fetch = {
            let mut slot = self.slot.lock();
            match &*slot {
                CatalogSlot::Ready(catalog) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!("Catalog cache hit");
                    return Ok(Arc::clone(catalog));
                }
                CatalogSlot::Pending(fetch) => {
                    self.counters.joins.fetch_add(1, Ordering::Relaxed);
                    debug!("Joining in-flight catalog fetch");
                    fetch.clone()
                }
                CatalogSlot::Empty | CatalogSlot::Failed(_) => {
                    let fetch = self.start_fetch();
                    *slot = CatalogSlot::Pending(fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// The cached catalog, without fetching.
    pub fn cached(&self) -> Option<Arc<PriceCatalog>> {
        match &*self.slot.lock() {
            CatalogSlot::Ready(catalog) => Some(Arc::clone(catalog)),
            _ => None,
        }
    }

    /// Error from the most recent fetch, if it failed.
    pub fn last_error(&self) -> Option<SwapFormError> {
        match &*self.slot.lock() {
            CatalogSlot::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Whether a fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        matches!(&*self.slot.lock(), CatalogSlot::Pending(_))
    }

    /// Get repository statistics.
    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            fetches_started: self.counters.fetches.load(Ordering::Relaxed),
            cache_hits: self.counters.hits.load(Ordering::Relaxed),
            joined_waiters: self.counters.joins.load(Ordering::Relaxed),
        }
    }

    fn start_fetch(&self) -> CatalogFetch {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        debug!("Starting catalog fetch");

        let feed = Arc::clone(&self.feed);
        let slot = Arc::clone(&self.slot);

        async move {
            let result = feed.fetch_prices().await.map(|records| {
                let total = records.len();
                let catalog = PriceCatalog::from_records(records);
                info!(
                    feed = feed.name(),
                    records = total,
                    entries = catalog.len(),
                    "Price catalog loaded"
                );
                Arc::new(catalog)
            });

            {
                let mut slot = slot.lock();
                *slot = match &result {
                    Ok(catalog) => CatalogSlot::Ready(Arc::clone(catalog)),
                    Err(e) => {
                        warn!(feed = feed.name(), error = %e, "Price catalog fetch failed");
                        CatalogSlot::Failed(e.clone())
                    }
                };
            }

            result
        }
        .boxed()
        .shared()
    }
}

/// Repository statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryStats {
    pub fetches_started: u64,
    pub cache_hits: u64,
    pub joined_waiters: u64,
}

/// Shared price repository.
pub type SharedPriceRepository = Arc<PriceRepository>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockPriceFeed;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use swapform_common::{Currency, PriceRecord};

    fn feed() -> MockPriceFeed {
        let now = Utc::now();
        MockPriceFeed::new(vec![
            PriceRecord::new("BTC", now, dec!(50000)),
            PriceRecord::new("ETH", now, dec!(2500)),
        ])
        .with_delay(Duration::from_millis(50))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fetch() {
        let feed = Arc::new(feed());
        let repository = Arc::new(PriceRepository::new(feed.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.get_catalog().await })
            })
            .collect();

        let mut catalogs = Vec::new();
        for handle in handles {
            catalogs.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(feed.calls(), 1);
        assert!(catalogs.iter().all(|c| Arc::ptr_eq(c, &catalogs[0])));
        assert_eq!(repository.stats().fetches_started, 1);
    }

    #[tokio::test]
    async fn test_cooperative_callers_share_one_fetch() {
        let feed = Arc::new(feed());
        let repository = PriceRepository::new(feed.clone());

        let results =
            futures::future::join_all((0..5).map(|_| repository.get_catalog())).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(feed.calls(), 1);
        assert_eq!(repository.stats().joined_waiters, 4);
    }

    #[tokio::test]
    async fn test_cached_catalog_is_reused() {
        let feed = Arc::new(feed());
        let repository = PriceRepository::new(feed.clone());

        assert!(repository.cached().is_none());
        let first = repository.get_catalog().await.unwrap();
        let second = repository.get_catalog().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(feed.calls(), 1);
        assert_eq!(repository.stats().cache_hits, 1);
        assert_eq!(
            repository.cached().unwrap().price_of(&Currency::new("ETH")),
            Some(dec!(2500))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failure_reaches_all_waiters_then_retries() {
        let feed = Arc::new(feed());
        feed.fail_next(1);
        let repository = Arc::new(PriceRepository::new(feed.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.get_catalog().await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(SwapFormError::Fetch(_))));
        }

        assert_eq!(feed.calls(), 1);
        assert!(repository.cached().is_none());
        assert!(repository.last_error().is_some());
        assert!(!repository.is_loading());

        let catalog = repository.get_catalog().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(feed.calls(), 2);
        assert!(repository.last_error().is_none());
    }
}
