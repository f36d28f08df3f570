//! Cache Entry Module
//!
//! Defines the record a backend stores for one key: the value and its
//! expiration, always read and written together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheValue, Expiration};

// == Cache Entry ==
/// Represents a single stored record with value and expiration metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: CacheValue,
    /// When the record stops being a hit
    pub expiration: Expiration,
    /// When the record was written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new record written at `stored_at`.
    pub fn new(value: CacheValue, expiration: Expiration, stored_at: DateTime<Utc>) -> Self {
        Self {
            value,
            expiration,
            stored_at,
        }
    }

    // == Is Expired ==
    /// Checks if the record has expired at `now`.
    ///
    /// Boundary condition: the record is expired once `now` reaches the deadline.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_expired_at(now)
    }
}
