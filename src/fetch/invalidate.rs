//! Mutation Invalidator
//!
//! Removes the cache keys a create/update/delete is known to affect. Keys
//! are rebuilt with the same derivation the reads use; anything that does
//! not match exactly (for example a multi-parameter list) is left alone.

use std::fmt;

use tracing::{debug, info};

use crate::cache::{CacheKey, SharedCache};

// == Resource Change ==
/// Describes one mutated resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    resource: String,
    id: Option<String>,
    params: Vec<(String, String)>,
}

impl ResourceChange {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: None,
            params: Vec::new(),
        }
    }

    /// Id of the mutated resource, invalidating its by-id key.
    pub fn id(mut self, id: impl fmt::Display) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// A list parameter the resource matches, e.g. `userId = 7` for a post
    /// by user 7.
    pub fn param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    // == Affected Keys ==
    /// The list-all key, the by-id key and one single-parameter list key
    /// per parameter.
    pub fn affected_keys(&self) -> Vec<CacheKey> {
        let mut keys = vec![CacheKey::all(&self.resource)];
        if let Some(id) = &self.id {
            keys.push(CacheKey::by_id(&self.resource, id));
        }
        for (name, value) in &self.params {
            keys.push(CacheKey::with_params(
                &self.resource,
                [(name.as_str(), value.as_str())],
            ));
        }
        keys.dedup();
        keys
    }
}

// == Invalidator ==
pub struct Invalidator<V> {
    cache: SharedCache<V>,
}

impl<V> Clone for Invalidator<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<V: Clone> Invalidator<V> {
    pub fn new(cache: SharedCache<V>) -> Self {
        Self { cache }
    }

    /// Removes every key affected by `changes`, returning how many entries
    /// were actually present.
    pub async fn invalidate(&self, changes: &[ResourceChange]) -> usize {
        let mut cache = self.cache.write().await;
        let mut removed = 0;

        for key in changes.iter().flat_map(ResourceChange::affected_keys) {
            if cache.remove_cache(key.as_str()) {
                debug!(key = %key, "Invalidated cache entry");
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Cache invalidation: removed {} entries", removed);
        }
        removed
    }
}
