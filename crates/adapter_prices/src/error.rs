//! Price retrieval error types.
//!
//! Every variant means the requested price data is unavailable; callers
//! that need to distinguish the cause (e.g. for HTTP status mapping) match
//! on the variant.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while retrieving a price series.
///
/// # Variants
///
/// - `UnknownTicker`: The provider does not know the symbol
/// - `Unreachable`: Transport failure talking to the provider
/// - `Timeout`: The provider did not answer within the fetch timeout
/// - `Malformed`: The provider answered with an undecodable payload
/// - `EmptySeries`: No usable prices remained after cleaning
/// - `InvalidLookback`: The lookback window cannot be represented
///
/// # Examples
///
/// ```
/// use adapter_prices::PriceError;
///
/// let err = PriceError::UnknownTicker("ZZZZ".to_string());
/// assert_eq!(format!("{}", err), "Unknown ticker: ZZZZ");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriceError {
    /// Ticker not known to the provider.
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Provider could not be reached.
    #[error("Price source unreachable: {0}")]
    Unreachable(String),

    /// Provider did not respond in time.
    #[error("Price source timed out after {0:?}")]
    Timeout(Duration),

    /// Provider response could not be decoded.
    #[error("Malformed price data: {0}")]
    Malformed(String),

    /// No prices left after dropping missing entries.
    #[error("No price data for {ticker} over the last {years} year(s)")]
    EmptySeries {
        /// Requested ticker
        ticker: String,
        /// Requested lookback in years
        years: u32,
    },

    /// Lookback reaches past the representable date range.
    #[error("Lookback of {years} year(s) is out of range")]
    InvalidLookback {
        /// Requested lookback in years
        years: u32,
    },
}

impl PriceError {
    /// Whether the failure originates from the provider link rather than
    /// from the data itself.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            PriceError::Unreachable(_) | PriceError::Timeout(_) | PriceError::Malformed(_)
        )
    }
}
