//! Bounded, TTL-limited in-memory caches for resolution byproducts.
//!
//! Three caches back the cascade, all keyed by best-effort string keys
//! and scoped to one page session:
//! - shortcode → media id (avoids the n+1 permalink fetch)
//! - media id → raw info-API response
//! - container key → resolved result
//!
//! Unlike a per-page script these maps are capacity- and TTL-bounded, and
//! `ResolverCaches::invalidate_all` gives embedders an explicit hook to
//! call on navigation.

use crate::core::config;
use crate::types::MediaResult;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CachedItem<V> {
    value: V,
    cached_at: Instant,
}

struct CacheState<V> {
    entries: HashMap<String, CachedItem<V>>,
    hits: u64,
    misses: u64,
}

/// Cache usage statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// A capacity- and TTL-bounded map.
///
/// Reads of expired entries remove them; inserts beyond capacity evict
/// the oldest entry first. All operations take one async mutex.
pub struct BoundedTtlCache<V: Clone> {
    state: Mutex<CacheState<V>>,
    capacity: usize,
    ttl: Duration,
}

impl<V: Clone> BoundedTtlCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Get a value, or None if absent or expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock().await;
        let expired = match state.entries.get(key) {
            Some(item) if item.cached_at.elapsed() < self.ttl => {
                let value = item.value.clone();
                state.hits += 1;
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            state.entries.remove(key);
        }
        state.misses += 1;
        None
    }

    /// Insert a value, evicting the oldest entry when full.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let mut state = self.state.lock().await;
        let key = key.into();
        if state.entries.len() >= self.capacity && !state.entries.contains_key(&key) {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, item)| item.cached_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                state.entries.remove(&oldest_key);
            }
        }
        state.entries.insert(
            key,
            CachedItem {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let mut state = self.state.lock().await;
        let before = state.entries.len();
        let ttl = self.ttl;
        state.entries.retain(|_, item| item.cached_at.elapsed() < ttl);
        before - state.entries.len()
    }

    /// Remove everything and reset counters.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let total = state.hits + state.misses;
        let hit_rate = if total > 0 {
            (state.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            size: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
            hit_rate,
        }
    }
}

/// The caches one `MediaResolver` instance carries.
pub struct ResolverCaches {
    /// shortcode → media id
    pub media_ids: BoundedTtlCache<String>,
    /// media id → raw info-API response
    pub info_responses: BoundedTtlCache<serde_json::Value>,
    /// container key → resolved result
    pub results: BoundedTtlCache<MediaResult>,
}

impl ResolverCaches {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            media_ids: BoundedTtlCache::new(capacity, ttl),
            info_responses: BoundedTtlCache::new(capacity, ttl),
            results: BoundedTtlCache::new(capacity, ttl),
        }
    }

    /// Navigation hook: a page change invalidates everything at once.
    pub async fn invalidate_all(&self) {
        self.media_ids.clear().await;
        self.info_responses.clear().await;
        self.results.clear().await;
        log::debug!("resolver caches invalidated");
    }
}

impl Default for ResolverCaches {
    fn default() -> Self {
        Self::new(config::cache::CAPACITY, config::cache::ttl())
    }
}
