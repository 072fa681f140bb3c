//! Prometheus metrics registry for the market data proxy.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the proxy cache and the HTTP middleware.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Reads served from a fresh cache entry.
    pub cache_hits_total: Counter,
    /// Reads that found no entry or an expired one.
    pub cache_misses_total: Counter,
    /// Outbound calls to the upstream API.
    pub upstream_requests_total: Counter,
    /// Outbound calls that ended in any error.
    pub upstream_errors_total: Counter,
    /// Entries physically held in the cache, stale ones included.
    pub cache_entries: Gauge,
    /// Expired entries dropped by the sweeper.
    pub cache_evictions_total: Counter,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    pub registry: Registry,
}

impl AppMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cache_hits_total = Counter::with_opts(Opts::new(
            "market_proxy_cache_hits_total",
            "Requests served from a fresh cache entry",
        ))?;

        let cache_misses_total = Counter::with_opts(Opts::new(
            "market_proxy_cache_misses_total",
            "Requests that missed the cache or found an expired entry",
        ))?;

        let upstream_requests_total = Counter::with_opts(Opts::new(
            "market_proxy_upstream_requests_total",
            "Upstream API requests issued",
        ))?;

        let upstream_errors_total = Counter::with_opts(Opts::new(
            "market_proxy_upstream_errors_total",
            "Upstream API requests that failed",
        ))?;

        let cache_entries = Gauge::with_opts(Opts::new(
            "market_proxy_cache_entries",
            "Entries currently held by the response cache",
        ))?;

        let cache_evictions_total = Counter::with_opts(Opts::new(
            "market_proxy_cache_evictions_total",
            "Expired cache entries removed by the sweeper",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "market_proxy_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "market_proxy_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(upstream_requests_total.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;
        registry.register(Box::new(cache_entries.clone()))?;
        registry.register(Box::new(cache_evictions_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            cache_hits_total,
            cache_misses_total,
            upstream_requests_total,
            upstream_errors_total,
            cache_entries,
            cache_evictions_total,
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_without_error() {
        let metrics = AppMetrics::new();
        assert!(metrics.is_ok(), "AppMetrics::new() failed: {:?}", metrics.err());
    }

    #[test]
    fn render_contains_every_metric_name() {
        let metrics = AppMetrics::new().unwrap();
        metrics.cache_hits_total.inc();
        metrics.cache_misses_total.inc();
        metrics.upstream_requests_total.inc();
        metrics.upstream_errors_total.inc();
        metrics.cache_entries.set(3.0);
        metrics.cache_evictions_total.inc();
        metrics
            .http_requests_total
            .with_label_values(&["GET", "/proxy", "200"])
            .inc();
        metrics.http_request_duration.observe(0.042);

        let output = metrics.render().unwrap();

        assert!(output.contains("market_proxy_cache_hits_total 1"));
        assert!(output.contains("market_proxy_cache_misses_total"));
        assert!(output.contains("market_proxy_upstream_requests_total"));
        assert!(output.contains("market_proxy_upstream_errors_total"));
        assert!(output.contains("market_proxy_cache_entries 3"));
        assert!(output.contains("market_proxy_cache_evictions_total"));
        assert!(output.contains("market_proxy_http_requests_total"));
        assert!(output.contains("market_proxy_http_request_duration_seconds"));
    }

    #[test]
    fn http_requests_counter_vec_labels_work() {
        let metrics = AppMetrics::new().unwrap();
        metrics
            .http_requests_total
            .with_label_values(&["GET", "/proxy", "429"])
            .inc();
        let val = metrics
            .http_requests_total
            .with_label_values(&["GET", "/proxy", "429"])
            .get();
        assert!((val - 1.0).abs() < f64::EPSILON);
    }
}
