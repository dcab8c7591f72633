//! Equity Risk Server
//!
//! REST API for historical VaR, volatility and stress tests.

use clap::Parser;
use risk_server::config::{build_config, CliArgs as ConfigCliArgs};
use risk_server::server::Server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Equity Risk Server - REST API for VaR, volatility and stress tests
#[derive(Parser, Debug)]
#[command(name = "risk_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "RISK_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RISK_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RISK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Price source (yahoo, synthetic)
    #[arg(long, env = "RISK_PRICE_SOURCE")]
    price_source: Option<String>,

    /// Number of cached price series (0 disables caching)
    #[arg(long, env = "RISK_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            price_source: args.price_source,
            cache_capacity: args.cache_capacity,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("Equity Risk Server v{}", risk_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        environment = %config.environment,
        price_source = %config.price_source,
        fetch_timeout_secs = config.fetch_timeout_secs,
        cache_capacity = config.cache_capacity,
        "Server configuration loaded"
    );
    tracing::info!(
        confidence = config.defaults.confidence,
        years = config.defaults.years,
        shock = config.defaults.shock,
        position = config.defaults.position,
        stress_lookback_years = config.defaults.stress_lookback_years,
        max_years = config.defaults.max_years,
        "Risk defaults"
    );

    let server = Server::new(config)?;
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await?;

    Ok(())
}
