//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::cache::{CacheBackend, CacheEntry, ManualClock};
use crate::error::{CacheError, Result};

pub fn fixed_clock() -> Arc<ManualClock> {
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    Arc::new(ManualClock::new(start))
}

/// Backend whose every call fails, standing in for an unreachable store.
#[derive(Debug, Default)]
pub struct UnreachableBackend;

fn unavailable<T>() -> Result<T> {
    Err(CacheError::BackendUnavailable("connection refused".to_string()))
}

impl CacheBackend for UnreachableBackend {
    fn fetch(&self, _key: &str) -> Result<Option<CacheEntry>> {
        unavailable()
    }

    fn contains(&self, _key: &str, _now: DateTime<Utc>) -> Result<bool> {
        unavailable()
    }

    fn store(&self, _key: &str, _entry: CacheEntry) -> Result<Option<String>> {
        unavailable()
    }

    fn remove(&self, _key: &str) -> Result<bool> {
        unavailable()
    }

    fn clear(&self) -> Result<()> {
        unavailable()
    }

    fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize> {
        unavailable()
    }

    fn len(&self) -> Result<usize> {
        unavailable()
    }
}
