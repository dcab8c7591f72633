//! Ticker-level risk operations.
//!
//! [`RiskEngine`] wires the [`PriceLoader`] to the pure statistics in this
//! crate. Parameters are validated before any price is requested.

use std::sync::Arc;

use adapter_prices::{PriceError, PriceLoader, MAX_LOOKBACK_YEARS};

use crate::error::RiskError;
use crate::returns::{simple_returns, MIN_PRICES};
use crate::stress::{apply_shock, validate_finite, StressResult};
use crate::var::{historical_var_from_returns, validate_confidence};
use crate::volatility::annualized_volatility_from_returns;

/// Lookback used to find the latest price for stress tests.
pub const DEFAULT_STRESS_LOOKBACK_YEARS: u32 = 3;

/// Risk metrics over cached price history.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    loader: Arc<PriceLoader>,
    stress_lookback_years: u32,
}

impl RiskEngine {
    /// Create an engine over a shared loader.
    pub fn new(loader: Arc<PriceLoader>) -> Self {
        Self {
            loader,
            stress_lookback_years: DEFAULT_STRESS_LOOKBACK_YEARS,
        }
    }

    /// Override the stress-test lookback.
    pub fn with_stress_lookback_years(mut self, years: u32) -> Self {
        self.stress_lookback_years = years;
        self
    }

    /// The underlying loader.
    pub fn loader(&self) -> &PriceLoader {
        &self.loader
    }

    /// Lookback used by [`RiskEngine::run_stress_test`].
    pub fn stress_lookback_years(&self) -> u32 {
        self.stress_lookback_years
    }

    /// Daily simple returns of `ticker` over the last `years` years.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` when fewer than two prices are available,
    ///   including an empty series
    /// - `DataUnavailable` for any other loader failure
    /// - `InvalidParameter` when `years` is zero or above [`MAX_LOOKBACK_YEARS`]
    pub async fn daily_returns(&self, ticker: &str, years: u32) -> Result<Vec<f64>, RiskError> {
        validate_years(years)?;
        let series = match self.loader.load_prices(ticker, years).await {
            Ok(series) => series,
            Err(PriceError::EmptySeries { .. }) => {
                return Err(RiskError::InsufficientData {
                    got: 0,
                    need: MIN_PRICES,
                })
            }
            Err(e) => return Err(lookback_error(e)),
        };
        simple_returns(&series.prices())
    }

    /// Historical VaR of `ticker` at `confidence` over `years` years.
    pub async fn historical_var(
        &self,
        ticker: &str,
        confidence: f64,
        years: u32,
    ) -> Result<f64, RiskError> {
        validate_confidence(confidence)?;
        let returns = self.daily_returns(ticker, years).await?;
        let var = historical_var_from_returns(&returns, confidence)?;

        tracing::debug!(ticker, confidence, years, samples = returns.len(), var, "Computed historical VaR");
        Ok(var)
    }

    /// Annualised volatility of `ticker` over `years` years.
    pub async fn volatility_annualized(&self, ticker: &str, years: u32) -> Result<f64, RiskError> {
        let returns = self.daily_returns(ticker, years).await?;
        let vol = annualized_volatility_from_returns(&returns)?;

        tracing::debug!(ticker, years, samples = returns.len(), vol, "Computed annualised volatility");
        Ok(vol)
    }

    /// Shock the latest price of `ticker` and value a `position`.
    ///
    /// # Errors
    ///
    /// `DataUnavailable` when no price exists; `InvalidParameter` for a
    /// non-finite shock or position.
    pub async fn run_stress_test(
        &self,
        ticker: &str,
        shock: f64,
        position: f64,
    ) -> Result<StressResult, RiskError> {
        validate_finite("shock", shock)?;
        validate_finite("position", position)?;

        let series = self
            .loader
            .load_prices(ticker, self.stress_lookback_years)
            .await
            .map_err(lookback_error)?;
        let last = series.last().ok_or_else(|| PriceError::EmptySeries {
            ticker: ticker.to_string(),
            years: self.stress_lookback_years,
        })?;

        let result = apply_shock(last.price, shock, position);
        tracing::debug!(ticker, shock, position, last_date = %last.date, pnl = result.pnl, "Ran stress test");
        Ok(result)
    }
}

fn validate_years(years: u32) -> Result<(), RiskError> {
    if years == 0 || years > MAX_LOOKBACK_YEARS {
        Err(RiskError::InvalidParameter(format!(
            "years must lie in 1..={}, got {}",
            MAX_LOOKBACK_YEARS, years
        )))
    } else {
        Ok(())
    }
}

/// Report an unrepresentable window as `InvalidParameter`.
fn lookback_error(e: PriceError) -> RiskError {
    match e {
        PriceError::InvalidLookback { years } => RiskError::InvalidParameter(format!(
            "lookback of {} year(s) is out of range",
            years
        )),
        e => e.into(),
    }
}
