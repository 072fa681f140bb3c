//! Caching read path in front of the upstream market-data API.
//!
//! [`ProxyCache`] is built once at startup, wrapped in `Arc`, and shared by
//! every handler that needs upstream data. The cache mutex is only held
//! for the in-memory lookup and the in-memory write, never across the
//! upstream await, so concurrent misses for one key may each fetch and the
//! last successful response wins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::cache::{cache_key, ResponseCache};
use crate::error::{AppError, MISSING_API_KEY_MESSAGE, MISSING_ENDPOINT_MESSAGE};
use crate::metrics::AppMetrics;

/// Source of live JSON payloads for endpoint identifiers.
#[async_trait]
pub trait UpstreamSource {
    /// Fetch `endpoint` from upstream and parse the body as JSON.
    async fn fetch_json(&self, endpoint: &str) -> Result<Value, AppError>;

    /// Whether the source has the credentials it needs to be called.
    fn is_configured(&self) -> bool {
        true
    }
}

pub struct ProxyCache {
    upstream: Arc<dyn UpstreamSource + Send + Sync>,
    cache: Mutex<ResponseCache<Value>>,
    metrics: Option<Arc<AppMetrics>>,
}

impl ProxyCache {
    pub fn new(upstream: Arc<dyn UpstreamSource + Send + Sync>, ttl: Duration) -> Self {
        Self {
            upstream,
            cache: Mutex::new(ResponseCache::new(ttl)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Return the payload for `endpoint`, from cache when fresh and from
    /// upstream otherwise. Failed fetches leave the cache untouched.
    pub async fn resolve(&self, endpoint: &str) -> Result<Value, AppError> {
        if endpoint.is_empty() {
            return Err(AppError::Validation(MISSING_ENDPOINT_MESSAGE.to_string()));
        }
        if !self.upstream.is_configured() {
            return Err(AppError::Config(MISSING_API_KEY_MESSAGE.to_string()));
        }

        let key = cache_key(endpoint);
        let cached = {
            let cache = self.cache.lock().await;
            cache.get(&key)
        };

        if let Some(value) = cached {
            tracing::info!("Cache HIT for {}", endpoint);
            self.record(|m| m.cache_hits_total.inc());
            return Ok(value);
        }

        tracing::info!("Cache MISS for {}. Fetching from upstream", endpoint);
        self.record(|m| {
            m.cache_misses_total.inc();
            m.upstream_requests_total.inc();
        });

        match self.upstream.fetch_json(endpoint).await {
            Ok(value) => {
                let entries = {
                    let mut cache = self.cache.lock().await;
                    cache.set(key, value.clone());
                    cache.len()
                };
                self.record(|m| m.cache_entries.set(entries as f64));
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("Upstream fetch for {} failed: {}", endpoint, err);
                self.record(|m| m.upstream_errors_total.inc());
                Err(err)
            }
        }
    }

    /// Drop expired entries. Fresh entries are never touched.
    pub async fn purge_expired(&self) -> usize {
        let (removed, entries) = {
            let mut cache = self.cache.lock().await;
            let removed = cache.purge_expired();
            (removed, cache.len())
        };
        self.record(|m| {
            m.cache_evictions_total.inc_by(removed as f64);
            m.cache_entries.set(entries as f64);
        });
        removed
    }

    pub fn is_upstream_configured(&self) -> bool {
        self.upstream.is_configured()
    }

    /// Number of entries physically held, stale ones included.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn ttl(&self) -> Duration {
        self.cache.lock().await.ttl()
    }

    fn record<F: FnOnce(&AppMetrics)>(&self, f: F) {
        if let Some(metrics) = self.metrics.as_deref() {
            f(metrics);
        }
    }
}
