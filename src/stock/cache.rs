//! Bounded response cache for the stock API.
//!
//! Keyed by request signature (`METHOD path?query`). Expired entries are
//! evicted before anything else; when the cache is still at capacity the
//! least-recently-used entry goes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::Method;

use crate::observability::metrics;

/// One cached upstream response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug)]
struct Entry {
    value: CachedResponse,
    inserted_at: Instant,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, Entry>,
    // Monotonic use counter; larger = more recently used.
    tick: u64,
    hits: u64,
    misses: u64,
}

/// Counters exposed on the admin surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Time-and-size-bounded response cache, safe for concurrent access.
pub struct ResponseCache {
    ttl: Duration,
    max_items: usize,
    inner: Mutex<CacheInner>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_items: usize) -> Self {
        Self {
            ttl,
            max_items,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Request signature used as the cache key.
    pub fn key(method: &Method, path_and_query: &str) -> String {
        format!("{method} {path_and_query}")
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.tick += 1;
        let tick = inner.tick;
        let ttl = self.ttl;

        let mut expired = false;
        let result = match inner.entries.get_mut(key) {
            Some(entry) if entry.inserted_at.elapsed() < ttl => {
                entry.last_used = tick;
                Some(entry.value.clone())
            }
            Some(_) => {
                expired = true;
                None
            }
            None => None,
        };
        if expired {
            inner.entries.remove(key);
        }

        if result.is_some() {
            inner.hits += 1;
            metrics::record_cache_event(true);
        } else {
            inner.misses += 1;
            metrics::record_cache_event(false);
        }
        result
    }

    pub fn insert(&self, key: String, value: CachedResponse) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");

        // TTL eviction first.
        let ttl = self.ttl;
        inner
            .entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);

        // Then LRU if still at capacity.
        if inner.entries.len() >= self.max_items && !inner.entries.contains_key(&key) {
            if let Some(lru_key) = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&lru_key);
            }
        }

        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
                last_used: tick,
            },
        );
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache mutex poisoned");
        CacheStats {
            size: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            content_type: Some("application/json".into()),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let key = ResponseCache::key(&Method::GET, "/items?sku=A1");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), response("{\"sku\":\"A1\"}"));
        let hit = cache.get(&key).expect("should be cached");
        assert_eq!(hit.body, Bytes::from_static(b"{\"sku\":\"A1\"}"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ResponseCache::new(Duration::from_millis(20), 10);
        let key = ResponseCache::key(&Method::GET, "/items");
        cache.insert(key.clone(), response("a"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_lru_eviction_when_full() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("GET /a".into(), response("a"));
        cache.insert("GET /b".into(), response("b"));

        // Touch /a so /b becomes the least recently used.
        cache.get("GET /a");

        cache.insert("GET /c".into(), response("c"));

        assert!(cache.get("GET /a").is_some());
        assert!(cache.get("GET /b").is_none());
        assert!(cache.get("GET /c").is_some());
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_expired_entries_evicted_before_lru() {
        let cache = ResponseCache::new(Duration::from_millis(20), 2);
        cache.insert("GET /a".into(), response("a"));
        cache.insert("GET /b".into(), response("b"));

        std::thread::sleep(Duration::from_millis(30));

        // Both old entries are past TTL; inserting must not evict by LRU
        // but simply drop the expired ones.
        cache.insert("GET /c".into(), response("c"));
        assert_eq!(cache.stats().size, 1);
        assert!(cache.get("GET /c").is_some());
    }

    #[test]
    fn test_reinsert_same_key_does_not_evict_others() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("GET /a".into(), response("a1"));
        cache.insert("GET /b".into(), response("b"));
        cache.insert("GET /a".into(), response("a2"));

        assert_eq!(cache.get("GET /a").unwrap().body, Bytes::from_static(b"a2"));
        assert!(cache.get("GET /b").is_some());
    }
}
