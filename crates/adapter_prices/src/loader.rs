//! Cached price loading.
//!
//! [`PriceLoader`] turns `(ticker, years)` into a clean [`PriceSeries`]:
//!
//! 1. Serve from the LRU cache when possible
//! 2. Otherwise compute the lookback window from the injected clock
//! 3. Fetch rows from the source, bounded by the fetch timeout
//! 4. Clean the rows and cache the non-empty result
//!
//! The cache mutex is never held across the source call, so two concurrent
//! misses on one key may both reach the provider.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::cache::{CacheKey, CacheStats, PriceCache, DEFAULT_CACHE_CAPACITY};
use crate::clock::{lookback_window, Clock, SystemClock};
use crate::error::PriceError;
use crate::series::PriceSeries;
use crate::source::PriceSource;

/// Default bound on a single provider call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Loads and memoizes daily price series.
pub struct PriceLoader {
    source: Arc<dyn PriceSource>,
    clock: Arc<dyn Clock>,
    cache: Mutex<PriceCache>,
    fetch_timeout: Duration,
}

impl std::fmt::Debug for PriceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceLoader")
            .field("source", &self.source.name())
            .field("fetch_timeout", &self.fetch_timeout)
            .field("cache_capacity", &self.cache_capacity())
            .finish()
    }
}

impl PriceLoader {
    /// Create a loader with the system clock, default capacity and timeout.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            cache: Mutex::new(PriceCache::with_capacity(DEFAULT_CACHE_CAPACITY)),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the cache with an empty one of the given capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Mutex::new(PriceCache::with_capacity(capacity));
        self
    }

    /// Set the bound on a single provider call.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    fn cache(&self) -> MutexGuard<'_, PriceCache> {
        // Entries are immutable once inserted, so a poisoned guard is still consistent.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load the daily price series of `ticker` over the last `years` years.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when the ticker is unknown, the source fails
    /// or times out, or no prices remain after cleaning.
    pub async fn load_prices(&self, ticker: &str, years: u32) -> Result<Arc<PriceSeries>, PriceError> {
        let key = CacheKey::new(ticker, years);

        let cached = self.cache().get(&key);
        if let Some(series) = cached {
            tracing::debug!(%key, points = series.len(), "Price cache hit");
            return Ok(series);
        }
        tracing::debug!(%key, "Price cache miss");

        let (start, end) = lookback_window(self.clock.now(), years)
            .ok_or(PriceError::InvalidLookback { years })?;
        let rows = tokio::time::timeout(self.fetch_timeout, self.source.fetch(ticker, start, end))
            .await
            .map_err(|_| PriceError::Timeout(self.fetch_timeout))??;

        let raw_rows = rows.len();
        let series = PriceSeries::from_rows(rows);
        if series.is_empty() {
            return Err(PriceError::EmptySeries {
                ticker: ticker.to_string(),
                years,
            });
        }

        tracing::info!(
            ticker,
            years,
            source = self.source.name(),
            raw_rows,
            points = series.len(),
            field = ?series.field(),
            "Loaded price series"
        );

        let series = Arc::new(series);
        if let Some(evicted) = self.cache().insert(key, Arc::clone(&series)) {
            tracing::debug!(%evicted, "Evicted least recently used price series");
        }
        Ok(series)
    }

    /// Name of the underlying source.
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Snapshot of cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Number of cached series.
    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }

    /// Cache capacity.
    pub fn cache_capacity(&self) -> usize {
        self.cache().capacity()
    }

    /// Whether `(ticker, years)` is currently cached.
    pub fn is_cached(&self, ticker: &str, years: u32) -> bool {
        self.cache().contains(&CacheKey::new(ticker, years))
    }

    /// The configured fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}
