//! # risk_metrics (P: Risk Kernel)
//!
//! Single-asset market risk over historical daily prices.
//!
//! This crate provides:
//! - Simple daily returns (`returns`)
//! - Historical VaR via linearly interpolated quantiles (`var`)
//! - Annualised volatility from the sample standard deviation (`volatility`)
//! - Single-shock stress tests on the latest price (`stress`)
//! - [`RiskEngine`]: ticker-level operations over a cached [`adapter_prices::PriceLoader`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           risk_metrics (P)              │
//! ├─────────────────────────────────────────┤
//! │  engine      - ticker-level operations  │
//! │  returns     - p[i]/p[i-1] - 1          │
//! │  var         - quantile, historical VaR │
//! │  volatility  - std dev * sqrt(252)      │
//! │  stress      - last * (1 + shock)       │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │           adapter_prices (A)            │
//! │  price sources, LRU cache, loader       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use risk_metrics::{historical_var_from_returns, simple_returns};
//!
//! let returns = simple_returns(&[100.0, 97.0, 99.0, 98.0, 102.0]).unwrap();
//! let var = historical_var_from_returns(&returns, 0.95).unwrap();
//! assert!(var > 0.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialisation for [`StressResult`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod engine;
pub mod error;
pub mod returns;
pub mod stress;
pub mod var;
pub mod volatility;

pub use engine::{RiskEngine, DEFAULT_STRESS_LOOKBACK_YEARS};
pub use error::RiskError;
pub use returns::{simple_returns, MIN_PRICES};
pub use stress::{apply_shock, validate_finite, StressResult};
pub use var::{historical_var_from_returns, quantile_linear, validate_confidence, MIN_RETURNS};
pub use volatility::{annualized_volatility_from_returns, sample_std_dev, TRADING_DAYS_PER_YEAR};
