//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache items and pools.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Unsupported or malformed TTL/expiration input, invalid key or config
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store could not be reached
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A typed value could not be encoded into or decoded from a cache value
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Returns true if the error came from argument validation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CacheError::InvalidArgument(_))
    }

    /// Returns true if the backing store was unreachable.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, CacheError::BackendUnavailable(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
