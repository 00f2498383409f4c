use crate::core::rates::{FetchError, RateSource, RateTable, RatesUnavailable};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

struct CachedTable {
    table: Arc<RateTable>,
    fetched_at: Instant,
}

/// Single-slot cache of the latest rate table.
///
/// A table younger than the TTL is served without touching the source.
/// When a refresh fails, the last table is served regardless of its age.
/// The slot lock is never held across a fetch, so concurrent expiries may
/// fetch twice; the later publish simply wins.
pub struct RateCache {
    source: Arc<dyn RateSource>,
    ttl: Duration,
    fetch_timeout: Duration,
    slot: RwLock<Option<CachedTable>>,
}

impl RateCache {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self::with_settings(source, DEFAULT_TTL, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_settings(source: Arc<dyn RateSource>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            slot: RwLock::new(None),
        }
    }

    pub async fn get_rates(&self) -> Result<Arc<RateTable>, RatesUnavailable> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!("Rate cache HIT");
                    return Ok(Arc::clone(&cached.table));
                }
                debug!("Rate cache entry expired");
            } else {
                debug!("Rate cache MISS");
            }
        }

        match self.refresh().await {
            Ok(table) => Ok(table),
            Err(e) => {
                warn!(error = %e, "Failed to refresh exchange rates");
                match self.cached().await {
                    Some(stale) => {
                        info!("Serving stale exchange rates from cache");
                        Ok(stale)
                    }
                    None => Err(RatesUnavailable),
                }
            }
        }
    }

    /// Last published table, whatever its age.
    pub async fn cached(&self) -> Option<Arc<RateTable>> {
        self.slot
            .read()
            .await
            .as_ref()
            .map(|cached| Arc::clone(&cached.table))
    }

    async fn refresh(&self) -> Result<Arc<RateTable>, FetchError> {
        let raw = timeout(self.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))??;
        let table = Arc::new(RateTable::from_raw(raw)?);
        info!(currencies = table.currency_count(), "Fetched exchange rates");

        *self.slot.write().await = Some(CachedTable {
            table: Arc::clone(&table),
            fetched_at: Instant::now(),
        });
        Ok(table)
    }
}
