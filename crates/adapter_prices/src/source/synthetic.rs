//! Synthetic daily closes for offline runs.
//!
//! Each ticker gets its own deterministic geometric Brownian motion path,
//! sampled on weekdays only:
//!
//! S(t+dt) = S(t) * exp((μ - σ²/2)*dt + σ*sqrt(dt)*Z)

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use super::PriceSource;
use crate::error::PriceError;
use crate::series::PriceRow;

/// Offline price source generating GBM paths.
#[derive(Debug, Clone)]
pub struct SyntheticPriceSource {
    /// Annual drift (μ)
    pub drift: f64,
    /// Annual volatility (σ)
    pub volatility: f64,
    /// Price on the first generated day
    pub initial_price: f64,
}

impl SyntheticPriceSource {
    /// Create a source with explicit dynamics.
    pub fn new(drift: f64, volatility: f64, initial_price: f64) -> Self {
        Self {
            drift,
            volatility,
            initial_price,
        }
    }

    /// Generate rows for every weekday in `[start, end]`.
    pub fn generate(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceRow> {
        let mut rng = StdRng::seed_from_u64(ticker_seed(ticker));
        let dt = 1.0 / 252.0;
        let drift_term = (self.drift - 0.5 * self.volatility * self.volatility) * dt;
        let diffusion = self.volatility * dt.sqrt();

        let mut price = self.initial_price;
        let mut rows = Vec::new();
        let mut date = start;
        while date <= end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                rows.push(PriceRow::close(date, price));
                let z: f64 = StandardNormal.sample(&mut rng);
                price = (price * (drift_term + diffusion * z).exp()).max(0.0001);
            }
            date += Duration::days(1);
        }
        rows
    }
}

impl Default for SyntheticPriceSource {
    fn default() -> Self {
        Self::new(0.05, 0.20, 100.0) // 20% annual vol, 5% drift
    }
}

/// FNV-1a hash of the ticker, stable across runs.
fn ticker_seed(ticker: &str) -> u64 {
    ticker.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait::async_trait]
impl PriceSource for SyntheticPriceSource {
    async fn fetch(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRow>, PriceError> {
        Ok(self.generate(ticker, start.date_naive(), end.date_naive()))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_generates_weekdays_only() {
        let source = SyntheticPriceSource::default();
        // Mon 2024-01-01 .. Sun 2024-01-14
        let rows = source.generate("AAPL", d(2024, 1, 1), d(2024, 1, 14));

        assert_eq!(rows.len(), 10);
        assert!(rows
            .iter()
            .all(|r| !matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert_eq!(rows[0].close, Some(100.0));
    }

    #[test]
    fn test_same_ticker_same_path() {
        let source = SyntheticPriceSource::default();
        let a = source.generate("MSFT", d(2024, 1, 1), d(2024, 3, 1));
        let b = source.generate("MSFT", d(2024, 1, 1), d(2024, 3, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_tickers_diverge() {
        let source = SyntheticPriceSource::default();
        let a = source.generate("MSFT", d(2024, 1, 1), d(2024, 3, 1));
        let b = source.generate("GOOG", d(2024, 1, 1), d(2024, 3, 1));
        assert_ne!(a.last().unwrap().close, b.last().unwrap().close);
    }

    #[test]
    fn test_prices_stay_positive() {
        let source = SyntheticPriceSource::new(-0.5, 0.9, 10.0);
        let rows = source.generate("VOLATILE", d(2020, 1, 1), d(2024, 1, 1));
        assert!(rows.iter().all(|r| r.close.unwrap() > 0.0));
    }

    #[test]
    fn test_empty_when_window_inverted() {
        let source = SyntheticPriceSource::default();
        assert!(source
            .generate("AAPL", d(2024, 2, 1), d(2024, 1, 1))
            .is_empty());
    }
}
