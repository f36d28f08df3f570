//! Configuration Module
//!
//! Handles loading and validating pool configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::ExpirationResolver;
use crate::error::{CacheError, Result};

/// Pool configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of records the in-memory backend can hold
    pub max_entries: usize,
    /// Default TTL in seconds applied when an item is saved without one.
    /// `None` means such items never expire.
    pub default_ttl: Option<u64>,
    /// Background purge task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: none, items never expire)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }

    /// Checks that the configuration can back a working pool.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidArgument(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval == 0 {
            return Err(CacheError::InvalidArgument(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        ExpirationResolver::new(self.default_ttl_duration())?;
        Ok(())
    }

    /// Default TTL as a duration, if one is configured.
    pub fn default_ttl_duration(&self) -> Option<Duration> {
        self.default_ttl.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: None,
            cleanup_interval: 1,
        }
    }
}
