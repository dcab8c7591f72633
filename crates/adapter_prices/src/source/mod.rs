//! Price provider implementations.
//!
//! - [`YahooPriceSource`]: Yahoo Finance chart API over HTTP
//! - [`SyntheticPriceSource`]: Deterministic offline generator
//! - [`InMemoryPriceSource`]: Fixed rows per ticker, for tests and demos

mod in_memory;
mod synthetic;
mod yahoo;

pub use in_memory::InMemoryPriceSource;
pub use synthetic::SyntheticPriceSource;
pub use yahoo::{YahooPriceSource, DEFAULT_YAHOO_BASE_URL};

use crate::error::PriceError;
use crate::series::PriceRow;
use chrono::{DateTime, Utc};

/// Capability to fetch raw daily price history.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch daily rows for `ticker` between `start` and `end`.
    ///
    /// Rows may arrive in any order and may carry missing values; cleaning is
    /// the caller's job.
    async fn fetch(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRow>, PriceError>;

    /// Provider name for logs and health output.
    fn name(&self) -> &'static str;
}
