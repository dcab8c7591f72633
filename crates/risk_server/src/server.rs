//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port
//! and to drain in-flight requests on Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinError;

use crate::config::{ConfigError, ServerConfig};
use crate::routes::{self, AppState};

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server with the price source named in the configuration
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let state = AppState::from_config(Arc::new(config))?;
        Ok(Self::with_state(state))
    }

    /// Create a server over prepared application state
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.clone();
        let router = routes::build_router(state);

        Self { config, router }
    }

    /// Get the address string the server will bind to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server
    ///
    /// Binds to the configured host/port and serves requests until a
    /// shutdown signal arrives.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server with a specific listener
    ///
    /// This is useful for testing where you want to use a listener bound to port 0
    /// to get a random available port.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Server listening on {}", addr);

        let grace = self.config.shutdown_timeout();
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let serve = axum::serve(listener, self.router).with_graceful_shutdown(async move {
            let _ = stop_rx.changed().await;
        });
        let mut task = tokio::spawn(async move { serve.await });

        tokio::select! {
            joined = &mut task => return flatten(joined),
            _ = shutdown_signal() => {}
        }

        tracing::info!(grace_secs = grace.as_secs(), "Shutdown signal received, draining connections");
        let _ = stop_tx.send(true);
        drain(task, grace).await
    }

    /// Create a test server and return the bound address
    ///
    /// This binds to port 0 to get a random available port, starts the server
    /// in a background task, and returns the actual bound address.
    #[cfg(test)]
    pub async fn spawn_test_server(
        state: AppState,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::with_state(state);
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });

        // Give the server a moment to start
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        (addr, handle)
    }
}

fn flatten(joined: Result<std::io::Result<()>, JoinError>) -> std::io::Result<()> {
    joined.map_err(std::io::Error::other)?
}

async fn drain(
    task: tokio::task::JoinHandle<std::io::Result<()>>,
    grace: Duration,
) -> std::io::Result<()> {
    let abort = task.abort_handle();
    match tokio::time::timeout(grace, task).await {
        Ok(joined) => {
            tracing::info!("Server stopped");
            flatten(joined)
        }
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "Graceful shutdown timed out, dropping open connections");
            abort.abort();
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
