//! # adapter_prices (A: Adapter Layer)
//!
//! Historical daily equity prices for the risk service.
//!
//! This crate provides:
//! - [`PriceSource`]: capability trait for raw price providers
//! - [`YahooPriceSource`], [`SyntheticPriceSource`], [`InMemoryPriceSource`]
//! - [`PriceSeries`]: cleaned, strictly date-ordered positive prices
//! - [`PriceCache`]: bounded LRU keyed by `(ticker, years)`
//! - [`PriceLoader`]: window computation, timeout, cleaning and caching
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use adapter_prices::{InMemoryPriceSource, PriceLoader, PriceRow};
//! use chrono::{Duration, Utc};
//!
//! # tokio_test_block(async {
//! let today = Utc::now().date_naive();
//! let source = InMemoryPriceSource::new().with_rows(
//!     "ACME",
//!     vec![
//!         PriceRow::close(today - Duration::days(2), 10.0),
//!         PriceRow::close(today - Duration::days(1), 11.0),
//!     ],
//! );
//! let loader = PriceLoader::new(Arc::new(source));
//!
//! let series = loader.load_prices("ACME", 1).await.unwrap();
//! assert_eq!(series.prices(), vec![10.0, 11.0]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod clock;
pub mod error;
pub mod loader;
pub mod series;
pub mod source;

pub use cache::{CacheKey, CacheStats, PriceCache, DEFAULT_CACHE_CAPACITY};
pub use clock::{
    lookback_window, Clock, FixedClock, SystemClock, DAYS_PER_YEAR, MAX_LOOKBACK_YEARS,
};
pub use error::PriceError;
pub use loader::{PriceLoader, DEFAULT_FETCH_TIMEOUT};
pub use series::{PriceField, PricePoint, PriceRow, PriceSeries};
pub use source::{
    InMemoryPriceSource, PriceSource, SyntheticPriceSource, YahooPriceSource,
    DEFAULT_YAHOO_BASE_URL,
};
