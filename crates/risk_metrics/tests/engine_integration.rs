//! Integration tests for the risk pipeline end to end.

use std::sync::Arc;

use adapter_prices::{FixedClock, InMemoryPriceSource, PriceLoader, PriceRow, SyntheticPriceSource};
use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use risk_metrics::{
    annualized_volatility_from_returns, historical_var_from_returns, RiskEngine, RiskError,
};

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 28, 21, 0, 0).unwrap()))
}

#[tokio::test]
async fn test_engine_matches_pure_functions() {
    let first = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let prices = [100.0, 101.5, 99.8, 100.2, 98.7, 102.3, 103.0, 101.1];
    let rows = prices
        .iter()
        .enumerate()
        .map(|(i, p)| PriceRow::close(first + Duration::days(i as i64), *p))
        .collect();
    let source = InMemoryPriceSource::new().with_rows("ACME", rows);
    let loader = PriceLoader::new(Arc::new(source)).with_clock(clock());
    let engine = RiskEngine::new(Arc::new(loader));

    let returns = engine.daily_returns("ACME", 1).await.unwrap();
    let var = engine.historical_var("ACME", 0.9, 1).await.unwrap();
    let vol = engine.volatility_annualized("ACME", 1).await.unwrap();

    assert_eq!(returns.len(), prices.len() - 1);
    assert_relative_eq!(var, historical_var_from_returns(&returns, 0.9).unwrap());
    assert_relative_eq!(vol, annualized_volatility_from_returns(&returns).unwrap());
}

#[tokio::test]
async fn test_synthetic_volatility_near_model_volatility() {
    let source = SyntheticPriceSource::new(0.0, 0.25, 100.0);
    let loader = PriceLoader::new(Arc::new(source)).with_clock(clock());
    let engine = RiskEngine::new(Arc::new(loader));

    let vol = engine.volatility_annualized("SYNTH", 10).await.unwrap();

    // Ten years of daily GBM steps estimate sigma closely
    assert!((vol - 0.25).abs() < 0.03, "vol = {}", vol);
}

#[tokio::test]
async fn test_unknown_ticker_surfaces_as_data_unavailable() {
    let loader = PriceLoader::new(Arc::new(InMemoryPriceSource::new())).with_clock(clock());
    let engine = RiskEngine::new(Arc::new(loader));

    let err = engine.run_stress_test("NOPE", -0.2, 1.0).await.unwrap_err();

    assert!(matches!(err, RiskError::DataUnavailable(_)));
}
