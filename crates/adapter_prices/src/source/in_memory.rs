//! Fixed price rows served from memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::PriceSource;
use crate::error::PriceError;
use crate::series::PriceRow;

/// Price source backed by a ticker -> rows map.
///
/// Rows outside the requested window are filtered out. Every call to
/// [`PriceSource::fetch`] is counted, which lets tests observe caching.
#[derive(Debug, Default)]
pub struct InMemoryPriceSource {
    rows: RwLock<HashMap<String, Vec<PriceRow>>>,
    fetches: AtomicUsize,
}

impl InMemoryPriceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a ticker.
    pub fn with_rows(self, ticker: impl Into<String>, rows: Vec<PriceRow>) -> Self {
        self.insert(ticker, rows);
        self
    }

    /// Register or replace the rows for a ticker.
    pub fn insert(&self, ticker: impl Into<String>, rows: Vec<PriceRow>) {
        let mut map = self.rows.write().unwrap_or_else(|e| e.into_inner());
        map.insert(ticker.into(), rows);
    }

    /// Number of fetch calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PriceSource for InMemoryPriceSource {
    async fn fetch(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRow>, PriceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let map = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let rows = map
            .get(ticker)
            .ok_or_else(|| PriceError::UnknownTicker(ticker.to_string()))?;

        let (start, end) = (start.date_naive(), end.date_naive());
        Ok(rows
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .copied()
            .collect())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
