//! Expired-entry sweeper.
//!
//! Reads already ignore stale entries, so the sweeper only bounds memory:
//! endpoints are caller-supplied and a long-running process would
//! otherwise hold every stale payload it ever fetched.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time;

use crate::proxy::ProxyCache;

/// Run the sweep loop until `Ctrl+C` (SIGINT) is received.
pub async fn run_cache_sweeper(proxy: Arc<ProxyCache>, interval_seconds: u64) {
    let mut interval = time::interval(Duration::from_secs(interval_seconds));

    tracing::info!("Cache sweeper started (interval: {}s)", interval_seconds);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sweep_once(&proxy).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping cache sweeper.");
                break;
            }
        }
    }

    tracing::info!("Cache sweeper stopped cleanly");
}

/// Execute a single sweep. Extracted for testability.
async fn sweep_once(proxy: &ProxyCache) -> usize {
    let removed = proxy.purge_expired().await;
    if removed > 0 {
        tracing::debug!(
            "Swept {} expired cache entries, {} remain",
            removed,
            proxy.len().await
        );
    }
    removed
}
