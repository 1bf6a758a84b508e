//! API route handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use ipscope_core::constants::API_BANNER;
use ipscope_core::types::Provider;

use crate::dto::{HealthResponse, MessageResponse};
use crate::error::ApiError;
use crate::headers::lookup_headers;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new(API_BANNER))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started.elapsed().as_secs(),
        started_at: state.started_at,
        cache: state.service.cache().stats(),
        rate_limited_identities: state.service.limiter().tracked(),
    })
}

/// GET /api/lookup
pub async fn lookup_own(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<Response> {
    lookup(&state, peer, None, Provider::PRIMARY).await
}

/// GET /api/lookup/:address
pub async fn lookup_address(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(address): Path<String>,
) -> Result<Response> {
    lookup(&state, peer, Some(&address), Provider::PRIMARY).await
}

/// GET /api/lookup-alt
pub async fn lookup_alt_own(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<Response> {
    lookup(&state, peer, None, Provider::ALTERNATE).await
}

/// GET /api/lookup-alt/:address
pub async fn lookup_alt_address(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(address): Path<String>,
) -> Result<Response> {
    lookup(&state, peer, Some(&address), Provider::ALTERNATE).await
}

/// POST /api/clear-cache
///
/// Deliberately not rate limited.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let removed = state.service.clear_cache();
    info!(removed, "Cache flushed via API");
    Json(MessageResponse::new("Cache cleared successfully"))
}

async fn lookup(
    state: &AppState,
    peer: SocketAddr,
    address: Option<&str>,
    provider: Provider,
) -> Result<Response> {
    let identity = peer.ip().to_string();

    let outcome = state
        .service
        .lookup(&identity, address, provider)
        .await
        .map_err(ApiError::from)?;

    let headers = lookup_headers(&outcome.rate_limit, outcome.from_cache);
    Ok((StatusCode::OK, headers, Json(outcome.record.as_ref())).into_response())
}
