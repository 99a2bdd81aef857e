//! In-memory response cache for upstream platform APIs.
//!
//! A [`CachePool`] hands out one independent [`Cache`] per namespace (for
//! example `"mangadex.manga"` or `"xkcd.comic"`). Each namespace has its own
//! lock, capacity and time-to-live, so busy namespaces never contend with
//! quiet ones and nothing ever locks across namespaces. Namespaces use the
//! pool's settings unless [`CachePool::with_namespace`] overrides them.
//!
//! # Eviction
//! - **Capacity**: inserting into a full namespace evicts the least-recently
//!   used entry. Reads through [`Cache::get`] count as use, [`Cache::has`]
//!   does not.
//! - **Age**: an entry older than the TTL is reported as a miss (and dropped)
//!   even if it was never pushed out by capacity.
//!
//! Eviction is only observable as a miss; there are no callbacks.
//!
//! # Example
//!
//! ```
//! use dibari_cache::CachePool;
//!
//! let pool: CachePool<String> = CachePool::default();
//! pool.set("mangadex.manga", "abc", "{\"title\":\"Komi\"}".to_string());
//! assert!(pool.has("mangadex.manga", "abc"));
//! assert_eq!(pool.get("mangadex.manga", "abc").as_deref(), Some("{\"title\":\"Komi\"}"));
//! // Namespaces are fully independent.
//! assert_eq!(pool.get("xkcd.comic", "abc"), None);
//! ```

use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Maximum number of entries held per namespace unless configured otherwise.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(50).unwrap();
/// Maximum age of an entry unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A single namespace: a capacity-bounded LRU whose entries expire after a
/// fixed time-to-live.
pub struct Cache<V> {
    namespace: String,
    ttl: Duration,
    entries: Mutex<LruCache<String, Entry<V>>>,
}
impl<V: Clone> Cache<V> {
    pub fn new(namespace: impl Into<String>, capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self { namespace: namespace.into(), ttl, entries: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // A panic while holding the lock can't leave the LRU half-updated in a
    // way that matters to readers, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &Entry<V>) -> bool {
        entry.inserted_at.elapsed() < self.ttl
    }

    /// Returns a copy of the cached value, marking it as recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let lookup = entries.get(key).map(|entry| self.is_fresh(entry).then(|| entry.value.clone()));
        match lookup {
            Some(Some(value)) => {
                trace!(namespace = %self.namespace, key, "cache hit");
                Some(value)
            },
            Some(None) => {
                trace!(namespace = %self.namespace, key, "cache entry expired");
                entries.pop(key);
                None
            },
            None => {
                trace!(namespace = %self.namespace, key, "cache miss");
                None
            },
        }
    }

    /// Inserts (or replaces) a value, restarting its time-to-live.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let entry = Entry { value, inserted_at: Instant::now() };
        if let Some((evicted, _)) = self.lock().push(key.clone(), entry)
            && evicted != key
        {
            trace!(namespace = %self.namespace, key = %evicted, "cache entry evicted");
        }
    }

    /// Returns `true` if a fresh entry exists, without affecting recency.
    pub fn has(&self, key: &str) -> bool {
        self.lock().peek(key).is_some_and(|entry| self.is_fresh(entry))
    }

    /// Number of resident entries, including any that have expired but not
    /// yet been looked up.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Resident entry count for one namespace, for debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceStats {
    pub namespace: String,
    pub entries: usize,
}

/// Capacity and time-to-live of one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSettings {
    pub capacity: NonZeroUsize,
    pub ttl: Duration,
}
impl Default for NamespaceSettings {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY, ttl: DEFAULT_TTL }
    }
}

/// A set of independent [`Cache`] namespaces. Namespaces are created lazily
/// on first use, with the pool's default settings or the override registered
/// for that namespace.
///
/// The pool is an ordinary value: create one at startup and share it (behind
/// an [`Arc`]) with every component that talks to upstream services.
pub struct CachePool<V> {
    defaults: NamespaceSettings,
    overrides: HashMap<String, NamespaceSettings>,
    caches: RwLock<HashMap<String, Arc<Cache<V>>>>,
}
impl<V: Clone> CachePool<V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            defaults: NamespaceSettings { capacity, ttl },
            overrides: HashMap::new(),
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Gives `namespace` its own capacity and TTL. Overrides are set while
    /// building the pool, before any namespace exists.
    pub fn with_namespace(mut self, namespace: impl Into<String>, capacity: NonZeroUsize, ttl: Duration) -> Self {
        self.overrides.insert(namespace.into(), NamespaceSettings { capacity, ttl });
        self
    }

    /// The settings `namespace` is (or will be) created with.
    pub fn settings(&self, namespace: &str) -> NamespaceSettings {
        self.overrides.get(namespace).copied().unwrap_or(self.defaults)
    }

    /// Returns the cache for `namespace`, creating it if necessary.
    pub fn cache(&self, namespace: &str) -> Arc<Cache<V>> {
        if let Some(cache) = self.caches.read().unwrap_or_else(PoisonError::into_inner).get(namespace) {
            return Arc::clone(cache);
        }
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have created it between dropping the read lock
        // and acquiring the write lock.
        Arc::clone(
            caches
                .entry(namespace.to_string())
                .or_insert_with(|| {
                    let settings = self.settings(namespace);
                    Arc::new(Cache::new(namespace, settings.capacity, settings.ttl))
                }),
        )
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<V> {
        self.cache(namespace).get(key)
    }

    pub fn set(&self, namespace: &str, key: impl Into<String>, value: V) {
        self.cache(namespace).set(key, value);
    }

    pub fn has(&self, namespace: &str, key: &str) -> bool {
        self.cache(namespace).has(key)
    }

    /// Resident entry counts for every namespace created so far, sorted by name.
    pub fn namespaces(&self) -> Vec<NamespaceStats> {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = caches
            .values()
            .map(|cache| NamespaceStats { namespace: cache.namespace().to_string(), entries: cache.len() })
            .collect::<Vec<_>>();
        stats.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        stats
    }

    /// Empties every namespace.
    pub fn clear(&self) {
        for cache in self.caches.read().unwrap_or_else(PoisonError::into_inner).values() {
            cache.clear();
        }
    }
}
impl<V: Clone> Default for CachePool<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_overflow_evicts_least_recently_used() {
        let cache = Cache::new("test", DEFAULT_CAPACITY, DEFAULT_TTL);
        for i in 0..DEFAULT_CAPACITY.get() {
            cache.set(i.to_string(), i);
        }
        // Touch the oldest entry so that "1" becomes the least recently used.
        assert_eq!(cache.get("0"), Some(0));
        cache.set("overflow", 999);

        assert_eq!(cache.len(), DEFAULT_CAPACITY.get());
        assert!(!cache.has("1"));
        assert!(cache.has("0"));
        assert!(cache.has("2"));
        assert_eq!(cache.get("overflow"), Some(999));
    }

    #[test]
    fn test_has_does_not_refresh_recency() {
        let cache = Cache::new("test", capacity(2), DEFAULT_TTL);
        cache.set("a", 1);
        cache.set("b", 2);
        assert!(cache.has("a"));
        cache.set("c", 3);
        // "a" was only peeked, so it was still the least recently used.
        assert!(!cache.has("a"));
        assert!(cache.has("b"));
        assert!(cache.has("c"));
    }

    #[test]
    fn test_replacing_a_key_does_not_evict() {
        let cache = Cache::new("test", capacity(2), DEFAULT_TTL);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_a_miss() {
        let cache = Cache::new("test", DEFAULT_CAPACITY, Duration::from_secs(60));
        cache.set("key", "value".to_string());
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get("key").as_deref(), Some("value"));

        tokio::time::advance(Duration::from_secs(31)).await;
        // Still resident (nothing pushed it out) but too old.
        assert_eq!(cache.len(), 1);
        assert!(!cache.has("key"));
        assert_eq!(cache.get("key"), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_restarts_ttl() {
        let cache = Cache::new("test", DEFAULT_CAPACITY, Duration::from_secs(60));
        cache.set("key", 1);
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.set("key", 2);
        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(cache.get("key"), Some(2));
    }

    #[test]
    fn test_pool_namespaces_are_independent() {
        let pool = CachePool::new(capacity(1), DEFAULT_TTL);
        pool.set("one", "key", 1);
        pool.set("two", "key", 2);
        pool.set("two", "other", 3);

        // Overflowing "two" must not touch "one".
        assert_eq!(pool.get("one", "key"), Some(1));
        assert_eq!(pool.get("two", "key"), None);
        assert_eq!(pool.get("two", "other"), Some(3));
        assert_eq!(
            pool.namespaces(),
            vec![
                NamespaceStats { namespace: "one".to_string(), entries: 1 },
                NamespaceStats { namespace: "two".to_string(), entries: 1 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_namespace_overrides_expire_independently() {
        let pool = CachePool::new(capacity(10), Duration::from_secs(3600))
            .with_namespace("short", capacity(1), Duration::from_secs(600));
        pool.set("short", "key", 1);
        pool.set("long", "key", 2);

        tokio::time::advance(Duration::from_secs(601)).await;
        assert_eq!(pool.get("short", "key"), None);
        assert_eq!(pool.get("long", "key"), Some(2));

        pool.set("short", "a", 1);
        pool.set("short", "b", 2);
        assert!(!pool.has("short", "a"), "override capacity applies");
        assert_eq!(pool.settings("long"), NamespaceSettings { capacity: capacity(10), ttl: Duration::from_secs(3600) });
    }

    #[test]
    fn test_pool_returns_same_instance() {
        let pool: CachePool<u8> = CachePool::default();
        let a = pool.cache("ns");
        let b = pool.cache("ns");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_pool_clear() {
        let pool = CachePool::default();
        pool.set("one", "key", 1);
        pool.set("two", "key", 2);
        pool.clear();
        assert!(!pool.has("one", "key"));
        assert!(!pool.has("two", "key"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let pool = Arc::new(CachePool::new(capacity(1000), DEFAULT_TTL));
        let tasks = (0..8)
            .map(|task| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    for i in 0..100 {
                        pool.set("shared", format!("{task}-{i}"), i);
                        assert_eq!(pool.get("shared", &format!("{task}-{i}")), Some(i));
                    }
                })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(pool.cache("shared").len(), 800);
    }
}
