//! `GET /proxy?endpoint=<path>`: the cached pass-through to upstream.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, MISSING_ENDPOINT_MESSAGE};
use crate::proxy::ProxyCache;

/// Shared state for the proxy route.
pub type ProxyState = Arc<ProxyCache>;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    /// Upstream path including its own (URL-encoded) query string.
    pub endpoint: Option<String>,
}

pub async fn proxy(
    State(proxy): State<ProxyState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    // Repeated or undecodable `endpoint` values count as a missing one.
    let Query(params) = query.map_err(|rejection| {
        tracing::debug!("Rejected /proxy query: {}", rejection.body_text());
        AppError::Validation(MISSING_ENDPOINT_MESSAGE.to_string())
    })?;
    let endpoint = params.endpoint.unwrap_or_default();
    let payload = proxy.resolve(&endpoint).await?;
    Ok(Json(payload))
}

/// Bare `OPTIONS /proxy`. Requests carrying CORS pre-flight headers are
/// answered by the CORS layer before they get here.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        routing::get,
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::proxy::tests::MockUpstream;

    fn app_with(mock: &MockUpstream) -> Router {
        let state = Arc::new(ProxyCache::new(
            Arc::new(mock.clone()),
            Duration::from_secs(600),
        ));
        Router::new()
            .route("/proxy", get(proxy).options(preflight))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_endpoint_returns_400() {
        let mock = MockUpstream::new(vec![]);
        let (status, body) = call(app_with(&mock), "/proxy").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Endpoint query parameter is required" }));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn empty_endpoint_returns_400() {
        let mock = MockUpstream::new(vec![]);
        let (status, _) = call(app_with(&mock), "/proxy?endpoint=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn repeated_endpoint_returns_json_400() {
        let mock = MockUpstream::new(vec![]);
        let (status, body) = call(app_with(&mock), "/proxy?endpoint=%2Fa&endpoint=%2Fb").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Endpoint query parameter is required" }));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_returns_500() {
        let mock = MockUpstream::unconfigured();
        let (status, body) = call(app_with(&mock), "/proxy?endpoint=%2Fping").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "API key is not configured on the server." }));
    }

    #[tokio::test]
    async fn encoded_endpoint_is_decoded_before_resolve() {
        let mock = MockUpstream::new(vec![Ok(json!({ "ok": true }))]);
        let (status, body) = call(
            app_with(&mock),
            "/proxy?endpoint=%2Fsimple%2Fprice%3Fids%3Dbitcoin%26vs_currencies%3Dusd",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
        assert_eq!(
            mock.requested(),
            vec!["/simple/price?ids=bitcoin&vs_currencies=usd"]
        );
    }

    #[tokio::test]
    async fn upstream_status_and_body_are_passed_through() {
        let mock = MockUpstream::new(vec![Err(AppError::Upstream {
            status: 404,
            body: json!({ "error": "coin not found" }),
        })]);
        let (status, body) = call(app_with(&mock), "/proxy?endpoint=%2Fcoins%2Fnope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": { "error": "coin not found" } }));
    }

    #[tokio::test]
    async fn network_error_returns_generic_500() {
        let mock = MockUpstream::new(vec![Err(AppError::Network("dns failure".to_string()))]);
        let (status, body) = call(app_with(&mock), "/proxy?endpoint=%2Fping").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn bare_options_returns_200_with_empty_body() {
        let mock = MockUpstream::new(vec![]);
        let response = app_with(&mock)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/proxy")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
