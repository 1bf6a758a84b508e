//! # ipscope API Server
//!
//! Caching, rate-limited HTTP proxy in front of public IP geolocation providers.
//!
//! ## Endpoints
//!
//! - `GET /` - Service banner
//! - `GET /health` - Uptime, cache and limiter statistics
//! - `GET /api/lookup` - Locate the server's own public address (ipapi)
//! - `GET /api/lookup/:address` - Locate an address (ipapi)
//! - `GET /api/lookup-alt` - Locate the server's own public address (ipinfo)
//! - `GET /api/lookup-alt/:address` - Locate an address (ipinfo)
//! - `POST /api/clear-cache` - Flush the result cache
//!
//! Lookups carry `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`
//! headers, failed ones included, and successful lookups add `X-Cache`.
//! Clients are identified by peer IP address.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ipscope_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env();
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod routes;
mod handlers;
mod headers;
mod service;
mod state;
mod dto;
mod error;

#[cfg(test)]
mod testing;

pub use routes::create_router;
pub use service::{LookupFailure, LookupOutcome, LookupService};
pub use state::{AppState, ApiConfig};
pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use ipscope_core::error::Result;

/// API server for ipscope.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Creates a server around prepared state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address until Ctrl-C.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("ipscope API server listening on {}", addr);

        let sweeper = self.spawn_sweeper();
        let app = self.router();

        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        if let Some(handle) = sweeper {
            handle.abort();
        }
        Ok(result?)
    }

    /// Periodically drops expired cache entries and idle limiter windows.
    fn spawn_sweeper(&self) -> Option<tokio::task::JoinHandle<()>> {
        let period = self.state.config.cache.sweep_interval();
        if period.is_zero() {
            return None;
        }

        let state = self.state.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let (entries, windows) = state.service.sweep();
                if entries > 0 || windows > 0 {
                    debug!(entries, windows, "Swept stale state");
                }
            }
        }))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> Result<()> {
    let config = ApiConfig::from_env();
    let server = ApiServer::new(config)?;
    server.run(([0, 0, 0, 0], port)).await
}
