//! HTTP surface: route assembly, CORS, and request metrics.

pub mod health;
pub mod metrics;
pub mod proxy;
pub mod valuation;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::metrics::AppMetrics;
use crate::proxy::ProxyCache;
use crate::valuation::ValuationService;

/// Any origin may call the proxy with `GET` or `OPTIONS`.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the complete application router.
pub fn create_router(
    proxy_cache: Arc<ProxyCache>,
    valuation_service: Arc<ValuationService>,
    app_metrics: Arc<AppMetrics>,
) -> Router {
    let proxy_router = Router::new()
        .route("/proxy", get(proxy::proxy).options(proxy::preflight))
        .route("/health", get(health::health))
        .with_state(proxy_cache);

    let metrics_router = Router::new()
        .route("/metrics", get(metrics::render_metrics))
        .with_state(app_metrics.clone());

    Router::new()
        .merge(proxy_router)
        .merge(valuation::create_valuation_router(valuation_service))
        .merge(metrics_router)
        .route_layer(middleware::from_fn_with_state(
            app_metrics,
            metrics::track_http_metrics,
        ))
        .layer(cors_layer())
}
