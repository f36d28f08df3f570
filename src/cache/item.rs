//! Cache Item Module
//!
//! A transient handle on one key: the snapshot a pool lookup produced plus any
//! changes staged for the next save.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::cache::{
    CacheBackend, CacheEntry, CacheValue, Clock, Expiration, ExpirationResolver, Ttl,
};
use crate::error::{CacheError, Result};

// == Cache Item ==
/// One key's value and expiration as seen by a single lookup.
///
/// Hit/miss and the readable value are fixed when the pool creates the item.
/// Mutators only stage changes: [`CacheItem::get`] keeps returning the looked-up
/// snapshot until the item is saved and fetched again.
///
/// ```
/// use item_cache::{CachePool, Ttl};
///
/// let pool = CachePool::new(100, None).unwrap();
/// let mut item = pool.get_item("foo").unwrap();
/// assert!(!item.is_hit());
///
/// item.set("bar", Ttl::Seconds(60)).unwrap();
/// assert!(item.get().is_none());
/// pool.save(&item).unwrap();
///
/// let item = pool.get_item("foo").unwrap();
/// assert!(item.is_hit());
/// assert_eq!(item.get().and_then(|v| v.as_str()), Some("bar"));
/// ```
#[derive(Debug, Clone)]
pub struct CacheItem {
    key: String,
    hit: bool,
    /// Value read at lookup; only present on a hit
    snapshot: Option<CacheValue>,
    /// Value staged by `set`, persisted on save
    staged: Option<CacheValue>,
    expiration: Expiration,
    resolver: ExpirationResolver,
    clock: Arc<dyn Clock>,
    backend: Arc<dyn CacheBackend>,
}

impl CacheItem {
    // == Constructors ==
    /// Builds an item for a live record.
    pub(crate) fn hit(
        key: String,
        entry: CacheEntry,
        resolver: ExpirationResolver,
        clock: Arc<dyn Clock>,
        backend: Arc<dyn CacheBackend>,
    ) -> Self {
        Self {
            key,
            hit: true,
            snapshot: Some(entry.value),
            staged: None,
            expiration: entry.expiration,
            resolver,
            clock,
            backend,
        }
    }

    /// Builds an item for a key with no live record, expiring by the pool
    /// default as of `now`.
    pub(crate) fn miss(
        key: String,
        now: DateTime<Utc>,
        resolver: ExpirationResolver,
        clock: Arc<dyn Clock>,
        backend: Arc<dyn CacheBackend>,
    ) -> Self {
        Self {
            key,
            hit: false,
            snapshot: None,
            staged: None,
            expiration: resolver.resolve_default(now),
            resolver,
            clock,
            backend,
        }
    }

    // == Accessors ==
    /// Returns the key this item was looked up with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the looked-up value, or None on a miss.
    ///
    /// Values staged with [`CacheItem::set`] are not visible here.
    pub fn get(&self) -> Option<&CacheValue> {
        if self.hit {
            self.snapshot.as_ref()
        } else {
            None
        }
    }

    /// Decodes the looked-up value into `T`.
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.get().map(CacheValue::decode).transpose()
    }

    /// Returns whether the lookup that created this item found a live record.
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    /// Checks the pool for a live record without reading its value.
    ///
    /// The answer reflects the store at call time, so it may disagree with
    /// [`CacheItem::is_hit`]. If the store cannot be reached, reports `true`.
    pub fn exists(&self) -> bool {
        match self.backend.contains(&self.key, self.clock.now()) {
            Ok(found) => found,
            Err(err) => {
                warn!(key = %self.key, error = %err, "existence check failed");
                true
            }
        }
    }

    /// Returns the expiration that a save would persist.
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    // == Mutators ==
    /// Stages `value` and sets the expiration from `ttl`, resolved now.
    ///
    /// `ttl` may be a [`Ttl`], whole seconds as `i64`, a `Duration`, an absolute
    /// `DateTime<Utc>`, or an `Option` of those. `Ttl::Unset` (or `None`)
    /// applies the pool default, or never expires without one.
    ///
    /// # Errors
    /// `InvalidArgument` if the deadline cannot be represented; the item is
    /// left unchanged.
    pub fn set(
        &mut self,
        value: impl Into<CacheValue>,
        ttl: impl Into<Ttl>,
    ) -> Result<&mut Self> {
        let expiration = self.resolver.resolve(ttl.into(), self.clock.now())?;
        self.staged = Some(value.into());
        self.expiration = expiration;
        Ok(self)
    }

    /// Sets an absolute deadline, or with `None` falls back to the pool
    /// default (or no expiration).
    pub fn expires_at(&mut self, deadline: Option<DateTime<Utc>>) -> Result<&mut Self> {
        let ttl = deadline.map_or(Ttl::Unset, Ttl::At);
        self.expiration = self.resolver.resolve(ttl, self.clock.now())?;
        Ok(self)
    }

    /// Sets the expiration to now plus a lifetime.
    ///
    /// # Errors
    /// `InvalidArgument` for anything other than `Ttl::Seconds` or
    /// `Ttl::After`, or a lifetime that overflows; the item is left unchanged.
    pub fn expires_after(&mut self, lifetime: impl Into<Ttl>) -> Result<&mut Self> {
        let lifetime = lifetime.into();
        if !matches!(lifetime, Ttl::Seconds(_) | Ttl::After(_)) {
            return Err(CacheError::InvalidArgument(format!(
                "expires_after takes seconds or a duration, got {:?}",
                lifetime
            )));
        }
        self.expiration = self.resolver.resolve(lifetime, self.clock.now())?;
        Ok(self)
    }

    /// Builds the record a save writes, or None if there is nothing to write.
    pub(crate) fn pending_entry(&self, stored_at: DateTime<Utc>) -> Option<CacheEntry> {
        let value = self.staged.clone().or_else(|| self.get().cloned())?;
        Some(CacheEntry::new(value, self.expiration, stored_at))
    }
}
