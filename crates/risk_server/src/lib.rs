//! REST API server for single-asset equity risk
//!
//! This crate exposes historical Value-at-Risk, annualised volatility and
//! single-shock stress tests over daily prices as read-only HTTP endpoints.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

// Re-export risk dependencies for integration
pub use adapter_prices;
pub use risk_metrics;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
