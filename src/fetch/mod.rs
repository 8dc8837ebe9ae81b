//! Fetch Module
//!
//! Cache-aware reads and mutation-driven invalidation.

mod invalidate;
mod orchestrator;

pub use invalidate::{Invalidator, ResourceChange};
pub use orchestrator::{CacheOptions, CacheValue, CachedFetcher};
