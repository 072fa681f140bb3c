//! Keyed in-memory TTL cache for upstream responses.
//!
//! Expiry is passive: a read re-checks `now - stored_at < ttl` every time
//! and treats an expired entry exactly like a missing one. Expired bytes
//! stay in the map until they are overwritten by the next successful
//! fetch or dropped by [`ResponseCache::purge_expired`].
//!
//! Timestamps come from `tokio::time::Instant` so tests can pause and
//! advance the clock instead of sleeping.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Default entry lifetime: ten minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Prefix prepended to every endpoint to form its cache key.
pub const CACHE_KEY_PREFIX: &str = "coingecko_";

/// Derive the cache key for an endpoint identifier.
///
/// Pure and injective: no normalisation is applied, so endpoints that
/// differ by a single character never share an entry.
pub fn cache_key(endpoint: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, endpoint)
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

/// In-memory TTL cache mapping keys to clonable response values.
#[derive(Debug)]
pub struct ResponseCache<T: Clone> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value only when it is still within TTL.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .filter(|entry| self.is_entry_fresh(entry))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry wholesale.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn is_fresh(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| self.is_entry_fresh(entry))
            .unwrap_or(false)
    }

    /// True when an entry is physically held, fresh or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries physically held, including stale ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry whose TTL has elapsed. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - self.entries.len()
    }

    fn is_entry_fresh(&self, entry: &CacheEntry<T>) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }
}
