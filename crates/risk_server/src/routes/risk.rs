//! Risk endpoints
//!
//! `GET /risk/var`, `GET /risk/volatility` and `GET /risk/stress`. Query
//! parameters are validated here and omitted ones are filled from
//! [`RiskDefaults`](crate::config::RiskDefaults).

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use risk_metrics::{validate_confidence, validate_finite, StressResult};

use super::AppState;
use crate::config::RiskDefaults;
use crate::error::ApiError;

/// Query for `GET /risk/var`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VarQuery {
    pub ticker: Option<String>,
    pub confidence: Option<f64>,
    pub years: Option<u32>,
}

/// Query for `GET /risk/volatility`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolatilityQuery {
    pub ticker: Option<String>,
    pub years: Option<u32>,
}

/// Query for `GET /risk/stress`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StressQuery {
    pub ticker: Option<String>,
    pub shock: Option<f64>,
    pub position: Option<f64>,
}

/// Historical VaR response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarResponse {
    pub ticker: String,
    pub confidence: f64,
    pub years: u32,
    /// Loss fraction not exceeded with probability `confidence`
    pub var: f64,
}

/// Annualised volatility response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityResponse {
    pub ticker: String,
    pub years: u32,
    pub vol_annualized: f64,
}

/// Stress test response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressResponse {
    pub ticker: String,
    pub shock: f64,
    #[serde(flatten)]
    pub result: StressResult,
}

/// Build the risk routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/risk/var", get(var_handler))
        .route("/risk/volatility", get(volatility_handler))
        .route("/risk/stress", get(stress_handler))
}

fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| ApiError::InvalidParameter(rejection.body_text()))
}

fn resolve_ticker(ticker: Option<String>) -> Result<String, ApiError> {
    match ticker.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(ApiError::InvalidParameter("ticker is required".to_string())),
    }
}

fn resolve_years(years: Option<u32>, defaults: &RiskDefaults) -> Result<u32, ApiError> {
    let years = years.unwrap_or(defaults.years);
    if years == 0 || years > defaults.max_years {
        return Err(ApiError::InvalidParameter(format!(
            "years must lie in 1..={}, got {}",
            defaults.max_years, years
        )));
    }
    Ok(years)
}

/// GET /risk/var - Historical Value-at-Risk
async fn var_handler(
    State(state): State<AppState>,
    query: Result<Query<VarQuery>, QueryRejection>,
) -> Result<Json<VarResponse>, ApiError> {
    let query = parse_query(query)?;
    let defaults = &state.config.defaults;

    let ticker = resolve_ticker(query.ticker)?;
    let confidence = query.confidence.unwrap_or(defaults.confidence);
    validate_confidence(confidence)?;
    let years = resolve_years(query.years, defaults)?;

    let var = state.engine.historical_var(&ticker, confidence, years).await?;

    Ok(Json(VarResponse {
        ticker,
        confidence,
        years,
        var,
    }))
}

/// GET /risk/volatility - Annualised volatility
async fn volatility_handler(
    State(state): State<AppState>,
    query: Result<Query<VolatilityQuery>, QueryRejection>,
) -> Result<Json<VolatilityResponse>, ApiError> {
    let query = parse_query(query)?;

    let ticker = resolve_ticker(query.ticker)?;
    let years = resolve_years(query.years, &state.config.defaults)?;

    let vol_annualized = state.engine.volatility_annualized(&ticker, years).await?;

    Ok(Json(VolatilityResponse {
        ticker,
        years,
        vol_annualized,
    }))
}

/// GET /risk/stress - Single-shock stress test on the latest price
async fn stress_handler(
    State(state): State<AppState>,
    query: Result<Query<StressQuery>, QueryRejection>,
) -> Result<Json<StressResponse>, ApiError> {
    let query = parse_query(query)?;
    let defaults = &state.config.defaults;

    let ticker = resolve_ticker(query.ticker)?;
    let shock = query.shock.unwrap_or(defaults.shock);
    let position = query.position.unwrap_or(defaults.position);
    validate_finite("shock", shock)?;
    validate_finite("position", position)?;

    let result = state.engine.run_stress_test(&ticker, shock, position).await?;

    Ok(Json(StressResponse {
        ticker,
        shock,
        result,
    }))
}
