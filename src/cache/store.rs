//! Memory Store Module
//!
//! In-memory backend combining HashMap storage with LRU-bounded capacity.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{CacheBackend, CacheEntry, LruTracker};
use crate::error::{CacheError, Result};

#[derive(Debug, Default)]
struct StoreState {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
}

// == Memory Store ==
/// In-memory [`CacheBackend`] holding at most `max_entries` records.
///
/// A single mutex guards records and access order, so every read and write of
/// a record is atomic with respect to every other.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    /// Maximum number of records allowed
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store with the given capacity.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| CacheError::BackendUnavailable("memory store lock poisoned".to_string()))
    }
}

impl CacheBackend for MemoryStore {
    // == Fetch ==
    fn fetch(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut state = self.lock()?;
        let entry = state.entries.get(key).cloned();
        if entry.is_some() {
            state.lru.touch(key);
        }
        Ok(entry)
    }

    fn contains(&self, key: &str, now: DateTime<Utc>) -> Result<bool> {
        let state = self.lock()?;
        Ok(state
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now)))
    }

    // == Store ==
    /// Overwriting an existing key never evicts. A new key at capacity evicts
    /// the least recently used record first.
    fn store(&self, key: &str, entry: CacheEntry) -> Result<Option<String>> {
        let mut state = self.lock()?;

        let is_overwrite = state.entries.contains_key(key);
        let mut evicted = None;

        if !is_overwrite && state.entries.len() >= self.max_entries {
            let oldest = state.lru.evict_oldest().ok_or_else(|| {
                CacheError::BackendUnavailable("store is full and eviction failed".to_string())
            })?;
            state.entries.remove(&oldest);
            debug!(key = %oldest, "evicted least recently used record");
            evicted = Some(oldest);
        }

        state.entries.insert(key.to_string(), entry);
        state.lru.touch(key);

        Ok(evicted)
    }

    // == Remove ==
    fn remove(&self, key: &str) -> Result<bool> {
        let mut state = self.lock()?;
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.lru.remove(key);
        }
        Ok(removed)
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.entries.clear();
        state.lru.clear();
        Ok(())
    }

    // == Purge Expired ==
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut state = self.lock()?;

        let expired_keys: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            state.entries.remove(key);
            state.lru.remove(key);
        }

        Ok(expired_keys.len())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.entries.len())
    }
}
