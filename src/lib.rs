//! dicecream - dice pool rolling service
//!
//! A pool of dice heaps with a synchronous core and an HTTP/WebSocket front.

pub mod api;
pub mod config;
pub mod dice;
pub mod error;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use api::{AppState, SharedPool};
pub use config::Config;
pub use error::DiceError;

/// The dicecream server instance
pub struct Server {
    config: Config,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance with the configured starting pool
    pub fn new(config: Config) -> Result<Self> {
        let pool = config
            .build_pool()
            .with_context(|| format!("invalid default pool '{}'", config.default_pool))?;
        info!(
            pool = %pool,
            roll_mode = %config.roll_mode,
            seeded = config.seed.is_some(),
            "pool ready"
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            state: AppState::new(pool),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the pool handle
    pub fn pool(&self) -> SharedPool {
        self.state.pool.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("dicecream listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("dicecream shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
