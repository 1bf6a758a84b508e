//! API error handling.

use std::time::Duration;

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use ipscope_core::constants::{THROTTLE_MESSAGE, UPSTREAM_ERROR_LABEL};
use ipscope_core::error::IpscopeError;

use crate::headers;
use crate::service::LookupFailure;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
    headers: HeaderMap,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message,
            headers: HeaderMap::new(),
        }
    }

    /// Rate limit rejection (429) with rate-limit and `Retry-After` headers.
    pub fn throttled(limit: u32, retry_after: Duration) -> Self {
        let mut err = Self::new(StatusCode::TOO_MANY_REQUESTS, THROTTLE_MESSAGE, None);
        headers::insert_rate_limit(&mut err.headers, limit, 0, retry_after);
        err.headers.insert(
            axum::http::header::RETRY_AFTER,
            HeaderValue::from(headers::ceil_secs(retry_after)),
        );
        err
    }

    /// Upstream failure, surfaced with the provider's status when it is an error status.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, UPSTREAM_ERROR_LABEL, Some(message.into()))
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(message.into()),
        )
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error,
            message: self.message,
        };

        (self.status, self.headers, Json(body)).into_response()
    }
}

impl From<IpscopeError> for ApiError {
    fn from(err: IpscopeError) -> Self {
        match err {
            IpscopeError::Throttled {
                limit, retry_after, ..
            } => ApiError::throttled(limit, retry_after),
            IpscopeError::Upstream { status, message } => ApiError::upstream(status, message),
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<LookupFailure> for ApiError {
    fn from(failure: LookupFailure) -> Self {
        let mut err = ApiError::from(failure.error);
        let decision = failure.rate_limit;
        headers::insert_rate_limit(
            &mut err.headers,
            decision.limit,
            decision.remaining,
            decision.reset_after,
        );
        err
    }
}
