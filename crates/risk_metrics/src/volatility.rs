//! Annualised volatility of daily returns.

use crate::error::RiskError;
use crate::var::MIN_RETURNS;

/// Trading days per year used to annualise daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Sample standard deviation with the `n - 1` denominator.
///
/// # Errors
///
/// `InsufficientData` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Result<f64, RiskError> {
    let n = values.len();
    if n < MIN_RETURNS {
        return Err(RiskError::InsufficientData {
            got: n,
            need: MIN_RETURNS,
        });
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Ok((sum_sq / (n - 1) as f64).sqrt())
}

/// Daily return standard deviation scaled by `sqrt(252)`.
///
/// # Examples
///
/// ```
/// use risk_metrics::annualized_volatility_from_returns;
///
/// let vol = annualized_volatility_from_returns(&[0.01, -0.01]).unwrap();
/// assert!((vol - 0.01 * 2f64.sqrt() * 252f64.sqrt()).abs() < 1e-12);
/// ```
pub fn annualized_volatility_from_returns(returns: &[f64]) -> Result<f64, RiskError> {
    Ok(sample_std_dev(returns)? * TRADING_DAYS_PER_YEAR.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_returns_zero_vol() {
        assert_eq!(annualized_volatility_from_returns(&[0.0; 30]).unwrap(), 0.0);
    }

    #[test]
    fn test_sample_std_dev_known_values() {
        // mean 5, squared deviations sum 32, n - 1 = 7
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sample_std_dev(&v).unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_annualisation_factor() {
        let returns = [0.01, -0.02, 0.015, 0.0, -0.005];
        let daily = sample_std_dev(&returns).unwrap();
        let annual = annualized_volatility_from_returns(&returns).unwrap();
        assert_relative_eq!(annual / daily, 252f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_shift_invariance() {
        let returns = [0.01, -0.02, 0.015, 0.0, -0.005];
        let shifted: Vec<f64> = returns.iter().map(|r| r + 0.3).collect();
        assert_relative_eq!(
            annualized_volatility_from_returns(&returns).unwrap(),
            annualized_volatility_from_returns(&shifted).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fewer_than_two_returns() {
        assert_eq!(
            annualized_volatility_from_returns(&[0.01]),
            Err(RiskError::InsufficientData { got: 1, need: 2 })
        );
        assert_eq!(
            sample_std_dev(&[]),
            Err(RiskError::InsufficientData { got: 0, need: 2 })
        );
    }
}
