//! Risk computation error types.

use adapter_prices::PriceError;
use thiserror::Error;

/// Errors raised by the risk pipeline.
///
/// # Variants
///
/// - `DataUnavailable`: Price data could not be obtained
/// - `InsufficientData`: Too few points for the statistic
/// - `InvalidParameter`: Caller supplied an out-of-domain argument
///
/// # Examples
///
/// ```
/// use risk_metrics::RiskError;
///
/// let err = RiskError::InsufficientData { got: 1, need: 2 };
/// assert_eq!(format!("{}", err), "Insufficient data: got 1, need 2");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    /// Price data unavailable (unknown ticker, unreachable source, empty result).
    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] PriceError),

    /// Not enough usable points after cleaning.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points available
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Parameter outside its valid domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
