//! Backend Module
//!
//! The storage port a [`CachePool`](crate::cache::CachePool) is built on.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;
use crate::error::Result;

/// Durable mapping from key to [`CacheEntry`].
///
/// Implementations must treat each record as one unit: `fetch` returns a value
/// together with the expiration it was stored with, and `store` replaces both
/// at once. A failed call must leave the affected key untouched.
pub trait CacheBackend: Send + Sync + Debug {
    /// Reads the record for `key`, expired or not.
    fn fetch(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Reports whether a live record exists for `key` at `now`, without
    /// materializing its value.
    fn contains(&self, key: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Replaces the record for `key`.
    ///
    /// Returns the key evicted to make room, if any.
    fn store(&self, key: &str, entry: CacheEntry) -> Result<Option<String>>;

    /// Removes the record for `key`, returning true if one existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Removes every record.
    fn clear(&self) -> Result<()>;

    /// Removes every record expired at `now`, returning how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Number of records held, including expired ones not yet purged.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Lets a caller keep its own handle on a backend a pool owns.
impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    fn fetch(&self, key: &str) -> Result<Option<CacheEntry>> {
        (**self).fetch(key)
    }

    fn contains(&self, key: &str, now: DateTime<Utc>) -> Result<bool> {
        (**self).contains(key, now)
    }

    fn store(&self, key: &str, entry: CacheEntry) -> Result<Option<String>> {
        (**self).store(key, entry)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        (**self).purge_expired(now)
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }
}
