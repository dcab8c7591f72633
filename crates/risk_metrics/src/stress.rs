//! Single-shock stress test on the latest price.

use crate::error::RiskError;

/// Outcome of shocking the latest price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressResult {
    /// Latest observed price
    pub last_price: f64,
    /// `last_price * (1 + shock)`
    pub shocked_price: f64,
    /// Position multiplier
    pub position: f64,
    /// `(shocked_price - last_price) * position`
    pub pnl: f64,
    /// The shock fraction as supplied; does not depend on `position`
    pub loss_pct: f64,
}

impl StressResult {
    /// Whether the scenario loses money.
    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}

/// Check that a stress input is a finite number.
pub fn validate_finite(name: &str, value: f64) -> Result<(), RiskError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RiskError::InvalidParameter(format!(
            "{} must be a finite number, got {}",
            name, value
        )))
    }
}

/// Apply a proportional `shock` to `last_price` for a `position`.
///
/// # Examples
///
/// ```
/// use risk_metrics::apply_shock;
///
/// let r = apply_shock(100.0, -0.2, 10.0);
/// assert!((r.shocked_price - 80.0).abs() < 1e-9);
/// assert!((r.pnl + 200.0).abs() < 1e-9);
/// assert_eq!(r.loss_pct, -0.2);
/// ```
pub fn apply_shock(last_price: f64, shock: f64, position: f64) -> StressResult {
    let shocked_price = last_price * (1.0 + shock);
    StressResult {
        last_price,
        shocked_price,
        position,
        pnl: (shocked_price - last_price) * position,
        loss_pct: shock,
    }
}
