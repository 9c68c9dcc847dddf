// In-memory cache store with per-entry expiration.
// Entries are checked lazily: an expired entry is purged by the read that finds it.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tracing::trace;

use super::clock::{Clock, SystemClock};

/// Default lifetime for cached entries: 12 hours.
pub const DEFAULT_ENTRY_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// An entry is expired at and after its expiration instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent key-value cache whose entries expire a fixed time after insertion.
///
/// There is no background sweep. Memory held by an expired entry is released
/// when that key is next read, overwritten or removed. Callers must also
/// tolerate any entry vanishing between two operations.
pub struct ExpiringCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
    lifetime: TimeDelta,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache on the system clock with the default 12 hour lifetime.
    pub fn new() -> Self {
        Self::with_lifetime(DEFAULT_ENTRY_LIFETIME)
    }

    /// Create a cache on the system clock with a custom entry lifetime.
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self::with_clock(Arc::new(SystemClock), lifetime)
    }

    /// Create a cache driven by the given time source.
    pub fn with_clock(clock: Arc<dyn Clock>, lifetime: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            lifetime: TimeDelta::from_std(lifetime).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Lifetime applied to every new entry.
    pub fn entry_lifetime(&self) -> Duration {
        self.lifetime.to_std().unwrap_or(Duration::MAX)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Get the value for `key` if present and not yet expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
        }

        // The read guard is released above; only evict if nobody refreshed the entry since.
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            trace!("evicted expired cache entry");
        }
        None
    }

    /// Remove the entry for `key`. No-op if absent.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key);
    }

    /// Insert when `Some`, remove when `None`.
    pub fn set(&self, key: K, value: Option<V>) {
        match value {
            Some(value) => self.insert(key, value),
            None => self.remove(&key),
        }
    }

    /// Whether an entry exists for `key`, expired or not.
    pub fn contains_entry<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("entries", &self.entries.len())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn cache_with_clock(lifetime: Duration) -> (Arc<ManualClock>, ExpiringCache<String, i32>) {
        let clock = Arc::new(ManualClock::default());
        let cache = ExpiringCache::with_clock(clock.clone(), lifetime);
        (clock, cache)
    }

    #[test]
    fn test_insert_then_get() {
        let (_clock, cache) = cache_with_clock(HOUR);
        cache.insert("octocat".to_string(), 1);
        assert_eq!(cache.get("octocat"), Some(1));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_default_lifetime() {
        let cache: ExpiringCache<String, i32> = ExpiringCache::new();
        assert_eq!(cache.entry_lifetime(), Duration::from_secs(43_200));
    }

    #[test]
    fn test_expires_at_boundary() {
        let (clock, cache) = cache_with_clock(HOUR);
        cache.insert("octocat".to_string(), 1);

        clock.advance(TimeDelta::seconds(3599));
        assert_eq!(cache.get("octocat"), Some(1));

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(cache.get("octocat"), None);
    }

    #[test]
    fn test_expired_read_evicts_entry() {
        let (clock, cache) = cache_with_clock(HOUR);
        cache.insert("octocat".to_string(), 1);
        clock.advance(TimeDelta::hours(2));

        // Still stored until something reads it.
        assert!(cache.contains_entry("octocat"));
        assert_eq!(cache.get("octocat"), None);
        assert!(!cache.contains_entry("octocat"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_resets_expiration() {
        let (clock, cache) = cache_with_clock(HOUR);
        cache.insert("octocat".to_string(), 1);

        clock.advance(TimeDelta::minutes(45));
        cache.insert("octocat".to_string(), 2);
        assert_eq!(cache.get("octocat"), Some(2));

        // Past the first insert's expiry, inside the second's.
        clock.advance(TimeDelta::minutes(30));
        assert_eq!(cache.get("octocat"), Some(2));

        clock.advance(TimeDelta::minutes(30));
        assert_eq!(cache.get("octocat"), None);
    }

    #[test]
    fn test_remove_and_set() {
        let (_clock, cache) = cache_with_clock(HOUR);
        cache.remove("absent");

        cache.set("octocat".to_string(), Some(7));
        assert_eq!(cache.get("octocat"), Some(7));

        cache.set("octocat".to_string(), None);
        assert_eq!(cache.get("octocat"), None);
        assert!(!cache.contains_entry("octocat"));

        cache.insert("hubot".to_string(), 3);
        cache.remove("hubot");
        assert_eq!(cache.get("hubot"), None);
    }

    #[test]
    fn test_clear() {
        let (_clock, cache) = cache_with_clock(HOUR);
        cache.insert("octocat".to_string(), 1);
        cache.insert("hubot".to_string(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("octocat"), None);
    }

    #[test]
    fn test_zero_lifetime_never_serves() {
        let (_clock, cache) = cache_with_clock(Duration::ZERO);
        cache.insert("octocat".to_string(), 1);
        assert_eq!(cache.get("octocat"), None);
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        let (_clock, cache) = cache_with_clock(Duration::MAX);
        cache.insert("octocat".to_string(), 1);
        assert_eq!(cache.get("octocat"), Some(1));
    }

    #[test]
    fn test_concurrent_access() {
        let cache: Arc<ExpiringCache<String, usize>> = Arc::new(ExpiringCache::with_lifetime(HOUR));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("user-{}", i % 10);
                        cache.insert(key.clone(), t);
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
