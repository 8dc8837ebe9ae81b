//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// A time-stamped cached payload.
///
/// Validity is computed lazily against a caller-supplied `now`; an entry is
/// never removed just because it expired.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The cached payload
    pub data: V,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Validity window in milliseconds
    pub ttl: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now`.
    ///
    /// # Arguments
    /// * `data` - The payload to store
    /// * `now` - Creation time in Unix milliseconds
    /// * `ttl` - Validity window in milliseconds
    pub fn new(data: V, now: u64, ttl: u64) -> Self {
        Self {
            data,
            timestamp: now,
            ttl,
        }
    }

    // == Is Valid ==
    /// Checks if the entry is still valid at `now`.
    ///
    /// Boundary condition: the entry becomes invalid once `now - timestamp`
    /// reaches `ttl`, so an entry with `ttl == 0` is never valid.
    pub fn is_valid(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) < self.ttl
    }

    // == Remaining ==
    /// Returns remaining validity in milliseconds, 0 once expired.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        self.ttl.saturating_sub(now.saturating_sub(self.timestamp))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_valid_within_ttl() {
        let entry = CacheEntry::new("users", 1_000, 5_000);

        assert!(entry.is_valid(1_000));
        assert!(entry.is_valid(5_999));
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let entry = CacheEntry::new("users", 1_000, 5_000);

        assert!(!entry.is_valid(6_000), "Entry should expire exactly at ttl");
        assert!(!entry.is_valid(6_001));
    }

    #[test]
    fn test_entry_zero_ttl_never_valid() {
        let entry = CacheEntry::new(1u32, 1_000, 0);
        assert!(!entry.is_valid(1_000));
    }

    #[test]
    fn test_entry_clock_behind_timestamp() {
        // A clock that moved backwards must not underflow
        let entry = CacheEntry::new(1u32, 10_000, 100);
        assert!(entry.is_valid(9_000));
        assert_eq!(entry.remaining_ms(9_000), 100);
    }

    #[test]
    fn test_remaining_ms() {
        let entry = CacheEntry::new((), 0, 10_000);

        assert_eq!(entry.remaining_ms(0), 10_000);
        assert_eq!(entry.remaining_ms(2_500), 7_500);
        assert_eq!(entry.remaining_ms(10_000), 0);
        assert_eq!(entry.remaining_ms(50_000), 0);
    }
}
