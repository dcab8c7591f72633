//! Health check and readiness endpoints
//!
//! Provides health and readiness endpoints for load balancer integration,
//! including price cache statistics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status ("healthy" or "unhealthy")
    pub status: String,
    /// Server version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Name of the configured price source
    pub price_source: String,
    /// Price cache status
    pub cache: CacheStatus,
}

/// Price cache status for health check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    /// Series currently cached
    pub entries: usize,
    /// Maximum number of cached series
    pub capacity: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that went to the price source
    pub misses: u64,
    /// Series evicted due to capacity
    pub evictions: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    /// Ready status
    pub ready: bool,
}

/// Build the health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let loader = state.engine.loader();
    let stats = loader.cache_stats();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        price_source: loader.source_name().to_string(),
        cache: CacheStatus {
            entries: loader.cache_len(),
            capacity: loader.cache_capacity(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready - Readiness probe endpoint
async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(ReadyResponse { ready: true }))
}
