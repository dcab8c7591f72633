//! Route modules for the risk server
//!
//! This module contains endpoint group-specific routers:
//! - risk: VaR, volatility and stress endpoints
//! - health: Health check and readiness endpoints

pub mod health;
pub mod risk;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use adapter_prices::{PriceLoader, PriceSource, SyntheticPriceSource, YahooPriceSource};
use risk_metrics::RiskEngine;

use crate::config::{ConfigError, PriceSourceKind, ServerConfig};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Risk engine over the shared price loader
    pub engine: Arc<RiskEngine>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create state over an explicit price source
    pub fn new(config: Arc<ServerConfig>, source: Arc<dyn PriceSource>) -> Self {
        let loader = PriceLoader::new(source)
            .with_cache_capacity(config.cache_capacity)
            .with_fetch_timeout(config.fetch_timeout());
        let engine = RiskEngine::new(Arc::new(loader))
            .with_stress_lookback_years(config.defaults.stress_lookback_years);

        Self {
            config,
            engine: Arc::new(engine),
            start_time: std::time::Instant::now(),
        }
    }

    /// Create state with the price source named in the configuration
    pub fn from_config(config: Arc<ServerConfig>) -> Result<Self, ConfigError> {
        let source: Arc<dyn PriceSource> = match config.price_source {
            PriceSourceKind::Yahoo => Arc::new(
                YahooPriceSource::new(&config.yahoo_base_url, config.fetch_timeout()).map_err(
                    |e| ConfigError::InvalidValue {
                        field: "yahoo_base_url",
                        reason: e.to_string(),
                    },
                )?,
            ),
            PriceSourceKind::Synthetic => Arc::new(SyntheticPriceSource::default()),
        };

        Ok(Self::new(config, source))
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::routes())
        .merge(risk::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
