use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::proxy::ProxyState;

/// Liveness plus a small cache summary. Never touches upstream.
pub async fn health(State(proxy): State<ProxyState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "upstream_configured": proxy.is_upstream_configured(),
        "cache_entries": proxy.len().await,
        "cache_ttl_seconds": proxy.ttl().await.as_secs(),
    });

    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(body),
    )
}
