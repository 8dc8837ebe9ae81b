//! Cache Module
//!
//! In-memory TTL cache with lazy expiry, deterministic keys and an opt-in
//! LRU bound.

mod clock;
mod entry;
mod key;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedCache};

// == Public Constants ==
/// Default entry TTL in milliseconds
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
