//! # Expiring Cache
//!
//! A time-boxed key/value store. Every entry expires a fixed TTL after it was
//! written; a background task sweeps expired entries on its own interval.
//!
//! The sweep only reclaims memory. Reads check the expiry themselves, so an
//! entry that has expired but not yet been swept is already reported absent.
//! There is no capacity bound.
//!
//! Time is read through `tokio::time::Instant`, so tests can drive expiry with
//! a paused clock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

type Entries<K, V> = RwLock<HashMap<K, Entry<V>>>;

/// Stand-in deadline for durations that would overflow the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline(now: Instant, after: Duration) -> Instant {
    now.checked_add(after).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Key/value cache with per-entry expiry and background eviction
pub struct ExpiringCache<K, V> {
    entries: Arc<Entries<K, V>>,
    ttl: Duration,
    sweeper: Option<JoinHandle<()>>,
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("ttl", &self.ttl)
            .field("sweeping", &self.sweeper.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache whose entries live for `ttl`, swept every `cleanup_interval`.
    ///
    /// The sweeper is spawned on the current Tokio runtime. Outside a runtime, or
    /// with a zero interval, no sweeper runs and expired entries are only
    /// dropped when overwritten or purged.
    pub fn new(ttl: Duration, cleanup_interval: Duration) -> Self {
        let entries = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = if cleanup_interval.is_zero() {
            None
        } else {
            tokio::runtime::Handle::try_current()
                .ok()
                .map(|handle| handle.spawn(sweep(Arc::downgrade(&entries), cleanup_interval)))
        };
        Self { entries, ttl, sweeper }
    }

    /// Default time-to-live for inserted entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value for `key` if present and not expired
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key` with the default TTL
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    /// Store `value` under `key`, expiring `ttl` from now
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expires_at = deadline(Instant::now(), ttl);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Entry { value, expires_at });
    }

    /// Remove `key`, returning its value if it had not expired
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value)
    }

    /// Drop every expired entry now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries)
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Drop for ExpiringCache<K, V> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

fn purge<K, V>(entries: &Entries<K, V>) -> usize
where
    K: Eq + Hash,
{
    let now = Instant::now();
    let mut entries = entries.write().unwrap_or_else(PoisonError::into_inner);
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    before - entries.len()
}

async fn sweep<K, V>(entries: Weak<Entries<K, V>>, interval: Duration)
where
    K: Eq + Hash,
{
    let interval = interval.min(FAR_FUTURE);
    let mut ticker = tokio::time::interval_at(deadline(Instant::now(), interval), interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        // The cache was dropped
        let Some(live) = entries.upgrade() else {
            break;
        };
        let removed = purge(&live);
        if removed > 0 {
            trace!(removed, "swept expired cache entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const TTL: Duration = Duration::from_secs(60);
    const SWEEP: Duration = Duration::from_secs(600);

    #[tokio::test(start_paused = true)]
    async fn test_value_visible_until_ttl() {
        let cache: ExpiringCache<String, String> = ExpiringCache::new(TTL, SWEEP);
        cache.insert("k".to_string(), "v".to_string());

        advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_absent_before_sweep() {
        // Sweep interval is much longer than the TTL
        let cache: ExpiringCache<String, String> = ExpiringCache::new(TTL, SWEEP);
        cache.insert("k".to_string(), "v".to_string());

        advance(TTL * 2).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 1, "entry is still stored until the sweep runs");
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_evicts() {
        let cache: ExpiringCache<String, String> = ExpiringCache::new(TTL, Duration::from_secs(30));
        cache.insert("k".to_string(), "v".to_string());

        advance(Duration::from_secs(90)).await;
        // Let the sweeper task observe the tick
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_expiry() {
        let cache: ExpiringCache<String, u32> = ExpiringCache::new(TTL, SWEEP);
        cache.insert("k".to_string(), 1);
        advance(Duration::from_secs(45)).await;
        cache.insert("k".to_string(), 2);
        advance(Duration::from_secs(45)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_with_custom_ttl() {
        let cache: ExpiringCache<String, u32> = ExpiringCache::new(TTL, SWEEP);
        cache.insert_with_ttl("short".to_string(), 1, Duration::from_secs(5));
        cache.insert("long".to_string(), 2);

        advance(Duration::from_secs(5)).await;
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some(2));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_durations_do_not_overflow() {
        let cache: ExpiringCache<&'static str, u32> = ExpiringCache::new(Duration::MAX, Duration::MAX);
        cache.insert("k", 1);
        cache.insert_with_ttl("j", 2, Duration::from_secs(u64::MAX));

        advance(Duration::from_secs(86_400 * 365)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.get("j"), Some(2));
    }

    #[test]
    fn test_works_without_runtime() {
        let cache: ExpiringCache<&'static str, u32> = ExpiringCache::new(TTL, SWEEP);
        cache.insert("k", 7);
        assert_eq!(cache.get("k"), Some(7));
        assert_eq!(cache.remove("k"), Some(7));
        assert!(cache.is_empty());
    }
}
