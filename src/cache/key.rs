//! Cache Key Module
//!
//! Deterministic cache key derivation from a resource type and query
//! parameters. Keys are plain string compositions, never hashes, so the
//! invalidator can rebuild exactly the keys a read produced.

use std::fmt;

// == Cache Key ==
/// A cache key such as `posts-all`, `posts-7` or `posts-userId=3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for the canonical "list all" query of a resource.
    pub fn all(resource: &str) -> Self {
        Self(format!("{}-all", resource))
    }

    /// Key for a single resource fetched by id.
    pub fn by_id(resource: &str, id: impl fmt::Display) -> Self {
        Self(format!("{}-{}", resource, id))
    }

    /// Key for a parameterized list query.
    ///
    /// Parameters are sorted by name so that the same query always yields
    /// the same key regardless of argument order. An empty parameter list
    /// yields the "list all" key.
    pub fn with_params<I, K, V>(resource: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        let mut pairs: Vec<(String, String)> = params
            .into_iter()
            .map(|(name, value)| (name.into(), value.to_string()))
            .collect();

        if pairs.is_empty() {
            return Self::all(resource);
        }

        pairs.sort();
        let query = pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        Self(format!("{}-{}", resource, query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_key() {
        assert_eq!(CacheKey::all("users").as_str(), "users-all");
    }

    #[test]
    fn test_by_id_key() {
        assert_eq!(CacheKey::by_id("posts", 42).as_str(), "posts-42");
    }

    #[test]
    fn test_single_param_key() {
        let key = CacheKey::with_params("posts", [("userId", 3)]);
        assert_eq!(key.as_str(), "posts-userId=3");
    }

    #[test]
    fn test_params_sorted_by_name() {
        let a = CacheKey::with_params("posts", [("userId", "3"), ("page", "2")]);
        let b = CacheKey::with_params("posts", [("page", "2"), ("userId", "3")]);

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "posts-page=2&userId=3");
    }

    #[test]
    fn test_empty_params_is_all_key() {
        let key = CacheKey::with_params("users", Vec::<(String, String)>::new());
        assert_eq!(key, CacheKey::all("users"));
    }
}
