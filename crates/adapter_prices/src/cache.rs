//! Bounded LRU cache of loaded price series.
//!
//! # Architecture
//!
//! The cache maps `(ticker, years)` to an immutable [`PriceSeries`] shared via
//! `Arc`. Recency is tracked with a monotonically increasing access tick;
//! when the entry count would exceed the capacity, the entry with the oldest
//! tick is evicted. There is no time-based invalidation.
//!
//! The cache itself is not synchronised. [`crate::PriceLoader`] owns it
//! behind a single mutex.

use std::collections::HashMap;
use std::sync::Arc;

use crate::series::PriceSeries;

/// Default number of distinct `(ticker, years)` entries kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Cache key: ticker and lookback in years.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Ticker symbol as requested
    pub ticker: String,
    /// Lookback in years
    pub years: u32,
}

impl CacheKey {
    /// Create a new key.
    pub fn new(ticker: impl Into<String>, years: u32) -> Self {
        Self {
            ticker: ticker.into(),
            years,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}y", self.ticker, self.years)
    }
}

#[derive(Debug)]
struct CacheEntry {
    series: Arc<PriceSeries>,
    last_access: u64,
}

/// Statistics for cache operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries stored
    pub insertions: u64,
    /// Entries evicted due to capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of price series.
#[derive(Debug)]
pub struct PriceCache {
    entries: HashMap<CacheKey, CacheEntry>,
    capacity: usize,
    tick: u64,
    stats: CacheStats,
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl PriceCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: every insert is discarded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Look up a series, refreshing its recency on a hit.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<PriceSeries>> {
        let tick = self.next_tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = tick;
                self.stats.hits += 1;
                Some(Arc::clone(&entry.series))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store a series, evicting the least recently used entry if full.
    ///
    /// Returns the evicted key, if any. Re-inserting an existing key replaces
    /// its series and refreshes its recency without evicting.
    pub fn insert(&mut self, key: CacheKey, series: Arc<PriceSeries>) -> Option<CacheKey> {
        if self.capacity == 0 {
            return None;
        }

        let mut evicted = None;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            evicted = self.evict_lru();
        }

        let last_access = self.next_tick();
        self.entries.insert(
            key,
            CacheEntry {
                series,
                last_access,
            },
        );
        self.stats.insertions += 1;
        evicted
    }

    fn evict_lru(&mut self) -> Option<CacheKey> {
        let lru_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone())?;

        self.entries.remove(&lru_key);
        self.stats.evictions += 1;
        Some(lru_key)
    }

    /// Whether `key` is cached, without touching recency or statistics.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Operation statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
