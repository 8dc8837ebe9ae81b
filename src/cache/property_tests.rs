//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check expiry, key derivation, invalidation scoping and
//! the bounded mode against arbitrary inputs.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::cache::{CacheKey, CacheStore, ManualClock, DEFAULT_TTL_MS};
use crate::fetch::ResourceChange;

// == Strategies ==
fn resource_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

fn param_strategy() -> impl Strategy<Value = (String, String)> {
    ("[a-zA-Z]{1,8}", "[a-zA-Z0-9]{1,8}")
}

fn store_at(start: u64) -> (CacheStore<u32>, ManualClock) {
    let clock = ManualClock::new(start);
    let store = CacheStore::with_clock(DEFAULT_TTL_MS, Arc::new(clock.clone()));
    (store, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // An entry written at t with ttl d is valid for every read before t + d
    // and invalid for every read from t + d on.
    #[test]
    fn prop_ttl_validity_boundary(
        written_at in 0u64..1_000_000_000,
        ttl in 1u64..10_000_000,
        offset in 0u64..20_000_000,
    ) {
        let (mut store, clock) = store_at(written_at);
        store.set_cache("users-all", 1, Some(ttl));

        clock.advance(offset);

        prop_assert_eq!(store.is_valid_cache("users-all"), offset < ttl);
        // Expiry never removes data
        prop_assert_eq!(store.get_cache("users-all"), Some(1));
    }

    // Parameter order does not change the derived key.
    #[test]
    fn prop_key_independent_of_param_order(
        resource in resource_strategy(),
        params in prop::collection::vec(param_strategy(), 0..6),
    ) {
        let mut reversed = params.clone();
        reversed.reverse();

        prop_assert_eq!(
            CacheKey::with_params(&resource, params.clone()),
            CacheKey::with_params(&resource, reversed)
        );
    }

    // Distinct ids of one resource never collide.
    #[test]
    fn prop_by_id_keys_unique(
        resource in resource_strategy(),
        a in any::<u64>(),
        b in any::<u64>(),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(CacheKey::by_id(&resource, a), CacheKey::by_id(&resource, b));
    }

    // Invalidating resource R with id X removes R's list key and R-X, and
    // leaves every key of another resource untouched.
    #[test]
    fn prop_invalidation_scoping(
        resource in resource_strategy(),
        other in resource_strategy(),
        id in 0u64..1_000,
        other_ids in prop::collection::vec(0u64..1_000, 1..20),
    ) {
        prop_assume!(resource != other);
        let (mut store, _) = store_at(0);

        store.set_cache(CacheKey::all(&resource), 0, None);
        store.set_cache(CacheKey::by_id(&resource, id), 0, None);
        let mut untouched = HashSet::new();
        for other_id in &other_ids {
            let key = CacheKey::by_id(&other, other_id);
            store.set_cache(key.clone(), 0, None);
            untouched.insert(key);
        }
        untouched.insert(CacheKey::all(&other));
        store.set_cache(CacheKey::all(&other), 0, None);

        for key in ResourceChange::new(resource.clone()).id(id).affected_keys() {
            store.remove_cache(key.as_str());
        }

        prop_assert!(store.get_cache(CacheKey::all(&resource).as_str()).is_none());
        prop_assert!(store.get_cache(CacheKey::by_id(&resource, id).as_str()).is_none());
        for key in &untouched {
            prop_assert!(store.get_cache(key.as_str()).is_some(), "{} was removed", key);
        }
    }

    // Bounded mode never holds more than its capacity.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::vec("[a-z0-9-]{1,16}", 1..200),
        max_entries in 1usize..50,
    ) {
        let (store, _) = store_at(0);
        let mut store = store.with_max_entries(max_entries);

        for key in keys {
            store.set_cache(key, 0, None);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // The last write for a key wins.
    #[test]
    fn prop_overwrite_semantics(
        key in "[a-z-]{1,16}",
        first in any::<u32>(),
        second in any::<u32>(),
    ) {
        let (mut store, _) = store_at(0);

        store.set_cache(key.clone(), first, None);
        store.set_cache(key.clone(), second, None);

        prop_assert_eq!(store.get_cache(&key), Some(second));
        prop_assert_eq!(store.len(), 1);
    }
}
