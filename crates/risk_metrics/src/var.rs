//! Historical Value-at-Risk.
//!
//! VaR at confidence `c` is the negated empirical `(1 - c)` quantile of the
//! return sample. The quantile uses linear interpolation between the two
//! order statistics bracketing the fractional rank `h = (n - 1) * p`.

use crate::error::RiskError;

/// Minimum number of returns for VaR and volatility.
pub const MIN_RETURNS: usize = 2;

/// Check that `confidence` lies strictly inside `(0, 1)`.
pub fn validate_confidence(confidence: f64) -> Result<(), RiskError> {
    if confidence.is_finite() && confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(RiskError::InvalidParameter(format!(
            "confidence must lie in (0, 1), got {}",
            confidence
        )))
    }
}

/// Empirical quantile with linear interpolation.
///
/// # Errors
///
/// - `InsufficientData` for an empty sample
/// - `InvalidParameter` when `p` is not in `[0, 1]`
///
/// # Examples
///
/// ```
/// use risk_metrics::quantile_linear;
///
/// let q = quantile_linear(&[4.0, 1.0, 3.0, 2.0], 0.5).unwrap();
/// assert_eq!(q, 2.5);
/// ```
pub fn quantile_linear(values: &[f64], p: f64) -> Result<f64, RiskError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RiskError::InvalidParameter(format!(
            "quantile probability must lie in [0, 1], got {}",
            p
        )));
    }
    if values.is_empty() {
        return Err(RiskError::InsufficientData { got: 0, need: 1 });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = h - lo as f64;

    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Historical VaR of a return sample, as a positive number for a loss.
///
/// # Errors
///
/// - `InvalidParameter` when `confidence` is outside `(0, 1)`
/// - `InsufficientData` for fewer than two returns
pub fn historical_var_from_returns(returns: &[f64], confidence: f64) -> Result<f64, RiskError> {
    validate_confidence(confidence)?;
    if returns.len() < MIN_RETURNS {
        return Err(RiskError::InsufficientData {
            got: returns.len(),
            need: MIN_RETURNS,
        });
    }

    let q = quantile_linear(returns, 1.0 - confidence)?;
    Ok(-q)
}
