//! Cache Module
//!
//! Cache items, the pools that resolve and persist them, and the TTL rules
//! both share.

mod backend;
mod clock;
mod entry;
mod expiration;
mod item;
mod lru;
mod pool;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod test_support;

// Re-export public types
pub use backend::CacheBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use expiration::{Expiration, ExpirationResolver, Ttl};
pub use item::CacheItem;
pub(crate) use lru::LruTracker;
pub use pool::CachePool;
pub use stats::CacheStats;
pub use store::MemoryStore;
pub use value::CacheValue;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
