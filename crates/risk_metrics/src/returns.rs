//! Simple daily returns.

use crate::error::RiskError;

/// Minimum number of prices needed to form one return.
pub const MIN_PRICES: usize = 2;

/// Day-over-day simple returns `p[i] / p[i-1] - 1`.
///
/// The undefined first entry is dropped, so the result has one element
/// fewer than `prices`.
///
/// # Errors
///
/// `InsufficientData` when fewer than two prices are given.
///
/// # Examples
///
/// ```
/// use risk_metrics::simple_returns;
///
/// let r = simple_returns(&[100.0, 110.0, 99.0]).unwrap();
/// assert_eq!(r.len(), 2);
/// assert!((r[0] - 0.10).abs() < 1e-12);
/// assert!((r[1] + 0.10).abs() < 1e-12);
/// ```
pub fn simple_returns(prices: &[f64]) -> Result<Vec<f64>, RiskError> {
    if prices.len() < MIN_PRICES {
        return Err(RiskError::InsufficientData {
            got: prices.len(),
            need: MIN_PRICES,
        });
    }

    Ok(prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
}
