//! Cache Pool Module
//!
//! Hands out [`CacheItem`]s resolved against a backend and persists them back.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::stats::StatsRecorder;
use crate::cache::{
    CacheBackend, CacheItem, CacheStats, Clock, ExpirationResolver, MemoryStore, SystemClock,
    MAX_KEY_LENGTH,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Pool ==
/// The source of truth for cached records.
///
/// Lookups take one time reading and one consistent read of the backend, so an
/// item's hit flag, value and expiration always agree. Saves write value and
/// expiration as a single record; concurrent saves to a key resolve to the last
/// one to complete.
#[derive(Debug)]
pub struct CachePool {
    backend: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    resolver: ExpirationResolver,
    stats: StatsRecorder,
}

impl CachePool {
    // == Constructors ==
    /// Creates an in-memory pool holding at most `max_entries` records.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity of the memory store
    /// * `default_ttl` - Lifetime for items saved without one; None = never expire
    ///
    /// # Errors
    /// `InvalidArgument` if `default_ttl` cannot be turned into a deadline.
    pub fn new(max_entries: usize, default_ttl: Option<Duration>) -> Result<Self> {
        Self::with_backend(MemoryStore::new(max_entries)).with_default_ttl(default_ttl)
    }

    /// Creates an in-memory pool from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.max_entries, config.default_ttl_duration())
    }

    /// Creates a pool over any backend, using the system clock and no default TTL.
    pub fn with_backend<B: CacheBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            clock: Arc::new(SystemClock),
            resolver: ExpirationResolver::default(),
            stats: StatsRecorder::default(),
        }
    }

    /// Replaces the time source used for lookups and by the items handed out.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the lifetime applied to items saved without an explicit one.
    ///
    /// The default is checked here so that lookups never fail on it.
    pub fn with_default_ttl(mut self, default_ttl: Option<Duration>) -> Result<Self> {
        self.resolver = ExpirationResolver::new(default_ttl)?;
        Ok(self)
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.resolver.default_ttl()
    }

    // == Get Item ==
    /// Looks up `key` and returns an item resolved as a hit or a miss.
    ///
    /// A stored record whose deadline has passed is reported as a miss. It is
    /// left in place for [`CachePool::purge_expired`] to reclaim.
    pub fn get_item(&self, key: &str) -> Result<CacheItem> {
        validate_key(key)?;

        let now = self.clock.now();
        let entry = self.backend.fetch(key).inspect_err(|err| {
            warn!(key, error = %err, "cache lookup failed");
        })?;

        match entry {
            Some(entry) if !entry.is_expired_at(now) => {
                debug!(key, "cache hit");
                self.stats.record_hit();
                Ok(CacheItem::hit(
                    key.to_string(),
                    entry,
                    self.resolver,
                    Arc::clone(&self.clock),
                    Arc::clone(&self.backend),
                ))
            }
            found => {
                if found.is_some() {
                    debug!(key, "cache miss, record expired");
                } else {
                    debug!(key, "cache miss");
                }
                self.stats.record_miss();
                Ok(CacheItem::miss(
                    key.to_string(),
                    now,
                    self.resolver,
                    Arc::clone(&self.clock),
                    Arc::clone(&self.backend),
                ))
            }
        }
    }

    // == Has Item ==
    /// Reports whether a live record exists for `key` without reading its value.
    pub fn has_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.backend.contains(key, self.clock.now())
    }

    // == Save ==
    /// Persists the item's value and expiration, replacing any previous record.
    ///
    /// Returns `false` without touching the store when the item has nothing to
    /// write (a miss that was never given a value).
    pub fn save(&self, item: &CacheItem) -> Result<bool> {
        let Some(entry) = item.pending_entry(self.clock.now()) else {
            debug!(key = item.key(), "nothing to save");
            return Ok(false);
        };

        let expiration = entry.expiration;
        let evicted = self.backend.store(item.key(), entry).inspect_err(|err| {
            warn!(key = item.key(), error = %err, "cache save failed");
        })?;

        self.stats.record_save();
        if evicted.is_some() {
            self.stats.record_eviction();
        }
        debug!(key = item.key(), ?expiration, "saved cache item");
        Ok(true)
    }

    // == Delete Item ==
    /// Removes the record for `key`, returning true if one existed.
    pub fn delete_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let removed = self.backend.remove(key)?;
        debug!(key, removed, "deleted cache item");
        Ok(removed)
    }

    /// Removes every record.
    pub fn clear(&self) -> Result<()> {
        self.backend.clear()?;
        info!("cache pool cleared");
        Ok(())
    }

    // == Purge Expired ==
    /// Removes every record expired as of now, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let removed = self.backend.purge_expired(self.clock.now())?;
        self.stats.record_purged(removed);
        Ok(removed)
    }

    // == Stats ==
    /// Returns current pool statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        Ok(self.stats.snapshot(self.backend.len()?))
    }

    /// Number of stored records, including expired ones not yet purged.
    pub fn len(&self) -> Result<usize> {
        self.backend.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.backend.is_empty()
    }
}

impl Default for CachePool {
    /// Memory-backed pool sized by [`Config::default`], with no default TTL.
    fn default() -> Self {
        Self::with_backend(MemoryStore::new(Config::default().max_entries))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidArgument(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::{fixed_clock, UnreachableBackend};
    use crate::cache::{CacheValue, Expiration, ManualClock, Ttl};
    use chrono::{DateTime, TimeDelta, Utc};

    fn test_pool() -> (CachePool, Arc<ManualClock>) {
        let clock = fixed_clock();
        let pool = CachePool::new(100, None).unwrap().with_clock(clock.clone());
        (pool, clock)
    }

    fn put(pool: &CachePool, key: &str, value: &str, ttl: Ttl) {
        let mut item = pool.get_item(key).unwrap();
        item.set(value, ttl).unwrap();
        assert!(pool.save(&item).unwrap());
    }

    #[test]
    fn test_round_trip() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "value1", Ttl::Unset);

        let item = pool.get_item("key1").unwrap();
        assert!(item.is_hit());
        assert_eq!(item.get().unwrap(), &CacheValue::from("value1"));
        assert_eq!(item.expiration(), Expiration::Never);
    }

    #[test]
    fn test_foo_bar_expiry_scenario() {
        let (pool, clock) = test_pool();

        let mut item = pool.get_item("foo").unwrap();
        item.set("bar", Ttl::Seconds(2)).unwrap();
        pool.save(&item).unwrap();

        let item = pool.get_item("foo").unwrap();
        assert!(item.is_hit());
        assert_eq!(item.get().unwrap(), &CacheValue::from("bar"));

        clock.advance(Duration::from_secs(3));

        let item = pool.get_item("foo").unwrap();
        assert!(!item.is_hit());
        assert!(item.get().is_none());
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "value1", Ttl::Seconds(0));

        let item = pool.get_item("key1").unwrap();
        assert!(!item.is_hit());
        assert!(item.get().is_none());
    }

    #[test]
    fn test_negative_ttl_is_immediately_expired() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "value1", Ttl::Seconds(-10));

        assert!(!pool.get_item("key1").unwrap().is_hit());
        assert!(!pool.has_item("key1").unwrap());
    }

    #[test]
    fn test_expired_save_replaces_live_record() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "live", Ttl::Unset);
        put(&pool, "key1", "dead", Ttl::Seconds(0));

        assert!(!pool.get_item("key1").unwrap().is_hit());
        assert_eq!(pool.len().unwrap(), 1);
    }

    #[test]
    fn test_setter_precedence_persisted() {
        let (pool, clock) = test_pool();
        let now = clock.now();

        let mut item = pool.get_item("key1").unwrap();
        item.set("value1", Ttl::Seconds(60))
            .unwrap()
            .expires_after(Ttl::Seconds(10))
            .unwrap();
        pool.save(&item).unwrap();

        let item = pool.get_item("key1").unwrap();
        assert_eq!(item.expiration(), Expiration::At(now + TimeDelta::seconds(10)));

        clock.advance(Duration::from_secs(11));
        assert!(!pool.get_item("key1").unwrap().is_hit());
    }

    #[test]
    fn test_default_ttl_applies_to_unset() {
        let clock = fixed_clock();
        let pool = CachePool::new(100, Some(Duration::from_secs(5)))
            .unwrap()
            .with_clock(clock.clone());
        put(&pool, "key1", "value1", Ttl::Unset);

        clock.advance(Duration::from_secs(4));
        assert!(pool.get_item("key1").unwrap().is_hit());

        clock.advance(Duration::from_secs(1));
        assert!(!pool.get_item("key1").unwrap().is_hit());
    }

    #[test]
    fn test_expiration_only_update_keeps_value() {
        let (pool, clock) = test_pool();
        put(&pool, "key1", "value1", Ttl::Seconds(5));

        let mut item = pool.get_item("key1").unwrap();
        item.expires_after(Ttl::Seconds(60)).unwrap();
        assert!(pool.save(&item).unwrap());

        clock.advance(Duration::from_secs(30));
        let item = pool.get_item("key1").unwrap();
        assert!(item.is_hit());
        assert_eq!(item.get().unwrap(), &CacheValue::from("value1"));
    }

    #[test]
    fn test_save_untouched_miss_is_noop() {
        let (pool, _) = test_pool();
        let item = pool.get_item("nothing").unwrap();

        assert!(!pool.save(&item).unwrap());
        assert!(pool.is_empty().unwrap());
    }

    #[test]
    fn test_exists_may_be_true_while_item_is_miss() {
        let (pool, _) = test_pool();
        let item = pool.get_item("key1").unwrap();
        put(&pool, "key1", "value1", Ttl::Unset);

        // A concurrent write landed after this item's lookup
        assert!(item.exists());
        assert!(!item.is_hit());
        assert!(pool.get_item("key1").unwrap().is_hit());
    }

    #[test]
    fn test_exists_tracks_expiry() {
        let (pool, clock) = test_pool();
        put(&pool, "key1", "value1", Ttl::Seconds(1));
        let item = pool.get_item("key1").unwrap();
        assert!(item.exists());

        clock.advance(Duration::from_secs(1));
        assert!(!item.exists());
        assert!(item.is_hit(), "Hit flag stays as resolved at lookup");
    }

    #[test]
    fn test_delete_item() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "value1", Ttl::Unset);

        assert!(pool.delete_item("key1").unwrap());
        assert!(!pool.delete_item("key1").unwrap());
        assert!(!pool.get_item("key1").unwrap().is_hit());
    }

    #[test]
    fn test_clear() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "value1", Ttl::Unset);
        put(&pool, "key2", "value2", Ttl::Unset);

        pool.clear().unwrap();
        assert!(pool.is_empty().unwrap());
    }

    #[test]
    fn test_purge_expired_updates_stats() {
        let (pool, clock) = test_pool();
        put(&pool, "short", "value", Ttl::Seconds(1));
        put(&pool, "long", "value", Ttl::Seconds(100));

        clock.advance(Duration::from_secs(2));
        assert_eq!(pool.purge_expired().unwrap(), 1);
        assert_eq!(pool.len().unwrap(), 1);

        let stats = pool.stats().unwrap();
        assert_eq!(stats.purged, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_stats_count_hits_misses_and_saves() {
        let (pool, _) = test_pool();
        put(&pool, "key1", "value1", Ttl::Unset); // miss + save
        pool.get_item("key1").unwrap(); // hit
        pool.get_item("nonexistent").unwrap(); // miss

        let stats = pool.stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.saves, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_evictions_are_counted() {
        let pool = CachePool::new(2, None).unwrap();
        put(&pool, "key1", "value1", Ttl::Unset);
        put(&pool, "key2", "value2", Ttl::Unset);
        put(&pool, "key3", "value3", Ttl::Unset);

        let stats = pool.stats().unwrap();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 2);
        assert!(!pool.get_item("key1").unwrap().is_hit());
    }

    #[test]
    fn test_key_validation() {
        let (pool, _) = test_pool();
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        assert!(matches!(
            pool.get_item(""),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            pool.get_item(&long_key),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(pool.has_item("").is_err());
        assert!(pool.delete_item(&long_key).is_err());
        assert!(pool.get_item(&"x".repeat(MAX_KEY_LENGTH)).is_ok());
    }

    #[test]
    fn test_unreachable_backend() {
        let pool = CachePool::with_backend(UnreachableBackend);

        assert!(matches!(
            pool.get_item("key1"),
            Err(CacheError::BackendUnavailable(_))
        ));
        assert!(pool.has_item("key1").unwrap_err().is_backend_unavailable());
        assert!(pool.purge_expired().is_err());
        assert!(pool.stats().is_err());
    }

    #[test]
    fn test_failed_save_leaves_store_untouched() {
        let reachable = CachePool::new(10, None).unwrap();
        put(&reachable, "key1", "value1", Ttl::Unset);
        let mut item = reachable.get_item("key1").unwrap();
        item.set("value2", Ttl::Unset).unwrap();

        let unreachable = CachePool::with_backend(UnreachableBackend);
        assert!(unreachable.save(&item).unwrap_err().is_backend_unavailable());
        assert_eq!(unreachable.stats.snapshot(0).saves, 0);

        let stored = reachable.get_item("key1").unwrap();
        assert_eq!(stored.get().unwrap(), &CacheValue::from("value1"));
    }

    #[test]
    fn test_out_of_range_default_ttl_rejected_at_build() {
        let huge = Some(Duration::from_secs(u64::MAX));

        assert!(matches!(
            CachePool::new(10, huge),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(CachePool::with_backend(MemoryStore::new(10))
            .with_default_ttl(huge)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_lookup_near_end_of_time_never_fails_on_default() {
        let clock = fixed_clock();
        let pool = CachePool::new(10, Some(Duration::from_secs(3600)))
            .unwrap()
            .with_clock(clock.clone());
        clock.set(DateTime::<Utc>::MAX_UTC - TimeDelta::seconds(1));

        let item = pool.get_item("foo").unwrap();
        assert!(!item.is_hit());
        assert_eq!(item.expiration(), Expiration::At(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_default_pool() {
        let pool = CachePool::default();
        assert_eq!(pool.default_ttl(), None);
        assert!(pool.is_empty().unwrap());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            max_entries: 10,
            default_ttl: Some(60),
            cleanup_interval: 1,
        };
        let pool = CachePool::from_config(&config).unwrap();
        assert_eq!(pool.default_ttl(), Some(Duration::from_secs(60)));

        let invalid = Config {
            max_entries: 0,
            ..config
        };
        assert!(CachePool::from_config(&invalid).is_err());
    }
}
