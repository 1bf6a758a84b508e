//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
///
/// Lookup handlers read the peer address, so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))

        // Primary provider
        .route("/api/lookup", get(handlers::lookup_own))
        .route("/api/lookup/", get(handlers::lookup_own))
        .route("/api/lookup/:address", get(handlers::lookup_address))

        // Alternate provider
        .route("/api/lookup-alt", get(handlers::lookup_alt_own))
        .route("/api/lookup-alt/", get(handlers::lookup_alt_own))
        .route("/api/lookup-alt/:address", get(handlers::lookup_alt_address))

        // Administration
        .route("/api/clear-cache", post(handlers::clear_cache))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, Response, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use ipscope_cache::ResultCache;
    use ipscope_core::types::Provider;
    use ipscope_limiter::{RateLimitConfig, RateLimiter};

    use crate::service::LookupService;
    use crate::state::ApiConfig;
    use crate::testing::FakeUpstream;

    fn test_app_with(max_requests: u32) -> (Router, Arc<AppState>, Arc<FakeUpstream>) {
        let upstream = Arc::new(FakeUpstream::new());
        let limiter = RateLimiter::with_config(RateLimitConfig {
            max_requests,
            window_seconds: 900,
        });
        let service = LookupService::new(
            Arc::new(ResultCache::new()),
            Arc::new(limiter),
            upstream.clone(),
        );
        let state = Arc::new(AppState::with_service(ApiConfig::default(), service));

        let app = create_router(state.clone())
            .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 10], 40000))));
        (app, state, upstream)
    }

    fn test_app() -> (Router, Arc<AppState>, Arc<FakeUpstream>) {
        test_app_with(100)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index() {
        let (app, _, _) = test_app();

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "IP Address Finder API");
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _, _) = test_app();

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache"]["total_entries"], 0);
    }

    #[tokio::test]
    async fn test_lookup_address_miss_then_hit() {
        let (app, _, upstream) = test_app();

        let response = app.clone().oneshot(get("/api/lookup/8.8.8.8")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "MISS");
        assert_eq!(response.headers()["ratelimit-limit"], "100");
        assert_eq!(response.headers()["ratelimit-remaining"], "99");
        let first = json_body(response).await;
        assert_eq!(first["ip"], "8.8.8.8");
        assert_eq!(first["city"], "Mountain View");
        assert!(first.get("region").is_none());

        let response = app.oneshot(get("/api/lookup/8.8.8.8")).await.unwrap();
        assert_eq!(response.headers()["x-cache"], "HIT");
        assert_eq!(json_body(response).await, first);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_own_address() {
        let (app, state, upstream) = test_app();

        let response = app.oneshot(get("/api/lookup")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["ip"], "203.0.113.7");
        assert_eq!(upstream.last_provider(), Some(Provider::IpApi));
        assert_eq!(state.service.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_trailing_slash_is_own_address() {
        let (app, state, upstream) = test_app();

        let response = app.clone().oneshot(get("/api/lookup/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["ip"], "203.0.113.7");
        assert_eq!(upstream.last_provider(), Some(Provider::IpApi));

        let response = app.oneshot(get("/api/lookup-alt/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "HIT");
        assert_eq!(upstream.calls(), 1);
        assert_eq!(state.service.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_alt_routes_use_alternate_provider() {
        let (app, _, upstream) = test_app();

        let response = app.clone().oneshot(get("/api/lookup-alt/1.1.1.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(upstream.last_provider(), Some(Provider::IpInfo));

        let response = app.oneshot(get("/api/lookup-alt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_upstream_error_response() {
        let (app, state, upstream) = test_app();
        upstream.fail_for("0.0.0.0", 404, "Please provide a valid IP address");

        let response = app.oneshot(get("/api/lookup/0.0.0.0")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["ratelimit-limit"], "100");
        assert_eq!(response.headers()["ratelimit-remaining"], "99");
        assert!(response.headers().contains_key("ratelimit-reset"));
        assert!(!response.headers().contains_key("x-cache"));
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to fetch IP details");
        assert_eq!(body["message"], "Please provide a valid IP address");
        assert!(state.service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let (app, _, upstream) = test_app_with(2);

        for _ in 0..2 {
            let response = app.clone().oneshot(get("/api/lookup/8.8.8.8")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get("/api/lookup/8.8.8.8")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["ratelimit-remaining"], "0");
        assert!(response.headers().contains_key("retry-after"));

        let body = json_body(response).await;
        assert_eq!(body["error"], "Too many requests, please try again later.");
        assert!(body.get("message").is_none());
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_is_not_rate_limited() {
        let (app, state, _) = test_app_with(1);

        let response = app.clone().oneshot(get("/api/lookup/8.8.8.8")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.service.cache().len(), 1);

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/clear-cache")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await["message"], "Cache cleared successfully");
        }

        assert!(state.service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache_requires_post() {
        let (app, _, _) = test_app();

        let response = app.oneshot(get("/api/clear-cache")).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
