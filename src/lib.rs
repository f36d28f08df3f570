//! Item Cache - keyed cache items over pluggable pools
//!
//! A [`CachePool`] hands out [`CacheItem`]s whose hit/miss state is resolved
//! atomically at lookup. Items stage a value and an expiration, expressed as
//! seconds, an absolute deadline or a relative duration, until they are saved
//! back to the pool.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheItem, CachePool, CacheValue, Expiration, Ttl};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
