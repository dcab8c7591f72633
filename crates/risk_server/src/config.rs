//! Server configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use adapter_prices::{DEFAULT_CACHE_CAPACITY, DEFAULT_YAHOO_BASE_URL, MAX_LOOKBACK_YEARS};
use risk_metrics::{validate_confidence, validate_finite, DEFAULT_STRESS_LOOKBACK_YEARS};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid environment: {0}. Must be one of: development, staging, production")]
    InvalidEnvironment(String),

    #[error("Invalid price source: {0}. Must be one of: yahoo, synthetic")]
    InvalidPriceSource(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where historical prices come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSourceKind {
    /// Yahoo Finance chart API
    #[default]
    Yahoo,
    /// Deterministic GBM paths, no network access
    Synthetic,
}

impl FromStr for PriceSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(PriceSourceKind::Yahoo),
            "synthetic" => Ok(PriceSourceKind::Synthetic),
            _ => Err(ConfigError::InvalidPriceSource(s.to_string())),
        }
    }
}

impl std::fmt::Display for PriceSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSourceKind::Yahoo => write!(f, "yahoo"),
            PriceSourceKind::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Request parameter defaults and limits
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskDefaults {
    /// VaR confidence level
    pub confidence: f64,
    /// Lookback in years for VaR and volatility
    pub years: u32,
    /// Proportional stress shock
    pub shock: f64,
    /// Stress position multiplier
    pub position: f64,
    /// Lookback used to find the latest price for stress tests
    pub stress_lookback_years: u32,
    /// Largest lookback a request may ask for
    pub max_years: u32,
}

impl Default for RiskDefaults {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            years: 3,
            shock: -0.2,
            position: 1.0,
            stress_lookback_years: DEFAULT_STRESS_LOOKBACK_YEARS,
            max_years: 50,
        }
    }
}

impl RiskDefaults {
    /// Validate the defaults against their own limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| ConfigError::InvalidValue { field, reason };

        if self.max_years == 0 || self.max_years > MAX_LOOKBACK_YEARS {
            return Err(invalid(
                "defaults.max_years",
                format!("{} is outside 1..={}", self.max_years, MAX_LOOKBACK_YEARS),
            ));
        }
        validate_confidence(self.confidence)
            .map_err(|e| invalid("defaults.confidence", e.to_string()))?;
        for (field, years) in [
            ("defaults.years", self.years),
            ("defaults.stress_lookback_years", self.stress_lookback_years),
        ] {
            if years == 0 || years > self.max_years {
                return Err(invalid(
                    field,
                    format!("{} is outside 1..={}", years, self.max_years),
                ));
            }
        }
        validate_finite("shock", self.shock).map_err(|e| invalid("defaults.shock", e.to_string()))?;
        validate_finite("position", self.position)
            .map_err(|e| invalid("defaults.position", e.to_string()))?;

        Ok(())
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Environment (development, staging, production)
    #[serde(deserialize_with = "deserialize_environment")]
    pub environment: Environment,
    /// Time allowed for in-flight requests after a shutdown signal
    pub shutdown_timeout_secs: u64,
    /// Price provider
    #[serde(deserialize_with = "deserialize_price_source")]
    pub price_source: PriceSourceKind,
    /// Base URL of the Yahoo chart API
    pub yahoo_base_url: String,
    /// Upper bound on a single price fetch
    pub fetch_timeout_secs: u64,
    /// Number of `(ticker, years)` series kept in memory; 0 disables caching
    pub cache_capacity: usize,
    /// Request parameter defaults
    pub defaults: RiskDefaults,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_environment<'de, D>(deserializer: D) -> Result<Environment, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Environment::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_price_source<'de, D>(deserializer: D) -> Result<PriceSourceKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    PriceSourceKind::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: LogLevel::Info,
            environment: Environment::Development,
            shutdown_timeout_secs: 30,
            price_source: PriceSourceKind::Yahoo,
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            fetch_timeout_secs: 5,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            defaults: RiskDefaults::default(),
        }
    }
}

/// Read and parse an environment variable if it is set
fn env_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::EnvError(format!("{}={}: {}", name, raw, e))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvError(format!("{}: {}", name, e))),
    }
}

impl ServerConfig {
    /// Override fields whose `RISK_*` environment variable is set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(host) = env_var::<String>("RISK_SERVER_HOST")? {
            self.host = host;
        }
        if let Some(port) = env_var("RISK_SERVER_PORT")? {
            self.port = port;
        }
        if let Some(log_level) = env_var::<String>("RISK_LOG_LEVEL")? {
            self.log_level = LogLevel::from_str(&log_level)?;
        }
        if let Some(env) = env_var::<String>("RISK_ENV")? {
            self.environment = Environment::from_str(&env)?;
        }
        if let Some(timeout) = env_var("RISK_SHUTDOWN_TIMEOUT_SECS")? {
            self.shutdown_timeout_secs = timeout;
        }
        if let Some(source) = env_var::<String>("RISK_PRICE_SOURCE")? {
            self.price_source = PriceSourceKind::from_str(&source)?;
        }
        if let Some(url) = env_var("RISK_YAHOO_BASE_URL")? {
            self.yahoo_base_url = url;
        }
        if let Some(timeout) = env_var("RISK_FETCH_TIMEOUT_SECS")? {
            self.fetch_timeout_secs = timeout;
        }
        if let Some(capacity) = env_var("RISK_CACHE_CAPACITY")? {
            self.cache_capacity = capacity;
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.price_source == PriceSourceKind::Yahoo && self.yahoo_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "yahoo_base_url",
                reason: "must not be empty".to_string(),
            });
        }

        self.defaults.validate()
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Shutdown grace period as a `Duration`
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(source) = &cli.price_source {
            self.price_source = PriceSourceKind::from_str(source)?;
        }
        if let Some(capacity) = cli.cache_capacity {
            self.cache_capacity = capacity;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Price source override
    pub price_source: Option<String>,
    /// Cache capacity override
    pub cache_capacity: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    config.apply_env()?;
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.price_source, PriceSourceKind::Yahoo);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_capacity, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_risk_parameters() {
        let defaults = RiskDefaults::default();
        assert_eq!(defaults.confidence, 0.95);
        assert_eq!(defaults.years, 3);
        assert_eq!(defaults.shock, -0.2);
        assert_eq!(defaults.position, 1.0);
        assert_eq!(defaults.stress_lookback_years, 3);
        assert_eq!(defaults.max_years, 50);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);

        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str("dev").unwrap(), Environment::Development);
        assert_eq!(Environment::from_str("stage").unwrap(), Environment::Staging);
        assert_eq!(Environment::from_str("PROD").unwrap(), Environment::Production);

        assert!(Environment::from_str("invalid").is_err());
    }

    #[test]
    fn test_price_source_parsing() {
        assert_eq!(PriceSourceKind::from_str("yahoo").unwrap(), PriceSourceKind::Yahoo);
        assert_eq!(
            PriceSourceKind::from_str("Synthetic").unwrap(),
            PriceSourceKind::Synthetic
        );
        assert!(matches!(
            PriceSourceKind::from_str("bloomberg"),
            Err(ConfigError::InvalidPriceSource(_))
        ));
        assert_eq!(PriceSourceKind::Synthetic.to_string(), "synthetic");
    }

    #[test]
    fn test_validation_rejects_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(0))));
    }

    #[test]
    fn test_validation_rejects_zero_fetch_timeout() {
        let config = ServerConfig {
            fetch_timeout_secs: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "fetch_timeout_secs", .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_defaults() {
        let cases = [
            RiskDefaults { confidence: 1.0, ..RiskDefaults::default() },
            RiskDefaults { confidence: 0.0, ..RiskDefaults::default() },
            RiskDefaults { years: 0, ..RiskDefaults::default() },
            RiskDefaults { years: 51, ..RiskDefaults::default() },
            RiskDefaults { stress_lookback_years: 0, ..RiskDefaults::default() },
            RiskDefaults { shock: f64::NAN, ..RiskDefaults::default() },
            RiskDefaults { position: f64::INFINITY, ..RiskDefaults::default() },
            RiskDefaults { max_years: 0, ..RiskDefaults::default() },
            RiskDefaults { max_years: 1_000_000, ..RiskDefaults::default() },
        ];

        for defaults in cases {
            assert!(defaults.validate().is_err(), "{:?} should be rejected", defaults);
        }
    }

    #[test]
    fn test_toml_parsing_with_partial_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            port = 9090
            log_level = "debug"
            price_source = "synthetic"
            cache_capacity = 16

            [defaults]
            confidence = 0.99
            years = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.price_source, PriceSourceKind::Synthetic);
        assert_eq!(config.cache_capacity, 16);
        assert_eq!(config.defaults.confidence, 0.99);
        assert_eq!(config.defaults.years, 5);
        // Unset fields keep their defaults
        assert_eq!(config.defaults.shock, -0.2);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_toml_rejects_unknown_price_source() {
        let result = ServerConfig::from_toml_str(r#"price_source = "bloomberg""#);
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("risk_server_config_{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "host = \"127.0.0.1\"\nport = 3000").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.socket_addr(), "127.0.0.1:3000");
    }

    fn write_temp_config(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.toml", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_build_config_file_then_cli() {
        let path = write_temp_config(
            "risk_server_build",
            "port = 3000\nprice_source = \"synthetic\"\n",
        );
        let cli = CliArgs {
            config_file: Some(path.clone()),
            port: Some(4000),
            ..CliArgs::default()
        };

        let config = build_config(&cli);
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.price_source, PriceSourceKind::Synthetic);
    }

    #[test]
    fn test_build_config_rejects_huge_max_years() {
        let path = write_temp_config("risk_server_max_years", "[defaults]\nmax_years = 1000000\n");
        let cli = CliArgs {
            config_file: Some(path.clone()),
            ..CliArgs::default()
        };

        let result = build_config(&cli);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "defaults.max_years", .. })
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = ServerConfig::from_file(&PathBuf::from("/nonexistent/risk_server.toml"));
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_merge_with_cli() {
        let mut config = ServerConfig::default();
        let cli = CliArgs {
            config_file: None,
            host: Some("127.0.0.1".to_string()),
            port: Some(3000),
            log_level: Some("debug".to_string()),
            price_source: Some("synthetic".to_string()),
            cache_capacity: Some(0),
        };

        config.merge_with_cli(&cli).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.price_source, PriceSourceKind::Synthetic);
        assert_eq!(config.cache_capacity, 0);
    }

    #[test]
    fn test_merge_with_cli_rejects_bad_log_level() {
        let mut config = ServerConfig::default();
        let cli = CliArgs {
            log_level: Some("loud".to_string()),
            ..CliArgs::default()
        };

        assert!(matches!(
            config.merge_with_cli(&cli),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_partial_cli_merge() {
        let mut config = ServerConfig::default();
        let cli = CliArgs {
            port: Some(9000),
            ..CliArgs::default()
        };

        config.merge_with_cli(&cli).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidPort(0);
        assert!(err.to_string().contains("Invalid port number"));

        let err = ConfigError::InvalidValue {
            field: "defaults.years",
            reason: "0 is outside 1..=50".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for defaults.years: 0 is outside 1..=50"
        );
    }
}
