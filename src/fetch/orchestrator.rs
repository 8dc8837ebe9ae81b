//! Cached Fetch Orchestrator
//!
//! Cache-first reads: serve a valid entry, otherwise run the request
//! through the pipeline and retry executor and store the result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::cache::SharedCache;
use crate::client::{execute_request, Pipeline, RetryPolicy};
use crate::error::{ApiError, FetchError};
use crate::state::OpClass;

// == Cache Value ==
/// Typed view of a value stored in a `CacheStore<V>`.
pub trait CacheValue<V>: Sized + Clone {
    fn into_value(self) -> V;

    /// `None` when the stored value holds a different shape.
    fn from_value(value: &V) -> Option<Self>;
}

impl<V: Clone> CacheValue<V> for V {
    fn into_value(self) -> V {
        self
    }

    fn from_value(value: &V) -> Option<Self> {
        Some(value.clone())
    }
}

// == Cache Options ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Serve a valid cached entry instead of calling out
    pub use_cache: bool,
    /// Store a successful result
    pub update_cache: bool,
    /// TTL in milliseconds for the stored result, the store default if `None`
    pub ttl: Option<u64>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            update_cache: true,
            ttl: None,
        }
    }
}

impl CacheOptions {
    pub fn with_ttl(ttl: u64) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Always call out, but still refresh the cache.
    pub fn bypass() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }
}

/// Per-key locks for coalescing concurrent misses.
type InFlight = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

// == Cached Fetcher ==
pub struct CachedFetcher<V> {
    cache: SharedCache<V>,
    pipeline: Pipeline,
    policy: RetryPolicy,
    in_flight: Option<InFlight>,
}

impl<V: Clone> CachedFetcher<V> {
    pub fn new(cache: SharedCache<V>, pipeline: Pipeline, policy: RetryPolicy) -> Self {
        Self {
            cache,
            pipeline,
            policy,
            in_flight: None,
        }
    }

    /// Coalesces concurrent misses for the same key.
    ///
    /// Callers queue behind the first one and re-check the cache once it
    /// finishes, so a successful fetch is shared. If the first fetch fails,
    /// the next caller tries on its own.
    pub fn with_single_flight(mut self) -> Self {
        self.in_flight = Some(Mutex::new(HashMap::new()));
        self
    }

    pub fn cache(&self) -> &SharedCache<V> {
        &self.cache
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    // == Fetch With Cache ==
    /// Returns the cached payload for `key` if valid, otherwise fetches it.
    ///
    /// Failures propagate. This layer never substitutes stale data; callers
    /// that want a stale fallback read the cache themselves.
    pub async fn fetch_with_cache<T, F, Fut>(
        &self,
        op: OpClass,
        key: &str,
        request_fn: F,
        options: CacheOptions,
    ) -> Result<T, ApiError>
    where
        T: CacheValue<V>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        if options.use_cache {
            if let Some(hit) = self.lookup::<T>(key).await {
                return Ok(hit);
            }
        }

        let slot = match (&self.in_flight, options.use_cache) {
            (Some(in_flight), true) => Some(
                in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key.to_string())
                    .or_default()
                    .clone(),
            ),
            _ => None,
        };
        let _turn = match &slot {
            Some(slot) => {
                let turn = slot.lock().await;
                // Another caller may have filled the cache while we waited
                if let Some(hit) = self.lookup::<T>(key).await {
                    return Ok(hit);
                }
                Some(turn)
            }
            None => None,
        };

        let result = self
            .pipeline
            .run(op, execute_request(request_fn, &self.policy))
            .await?;

        if options.update_cache {
            self.cache
                .write()
                .await
                .set_cache(key, result.clone().into_value(), options.ttl);
            debug!(key, "Cached fresh result");
        }

        Ok(result)
    }

    async fn lookup<T: CacheValue<V>>(&self, key: &str) -> Option<T> {
        let value = self.cache.write().await.get_valid(key)?;
        let hit = T::from_value(&value);
        if hit.is_some() {
            debug!(key, "Cache hit");
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, ManualClock};
    use crate::client::MemoryNotifier;
    use crate::state::RequestState;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fetcher(clock: &ManualClock) -> CachedFetcher<String> {
        let cache = CacheStore::with_clock(60_000, Arc::new(clock.clone())).shared();
        let pipeline = Pipeline::new(RequestState::shared(), Arc::new(MemoryNotifier::new()));
        CachedFetcher::new(cache, pipeline, RetryPolicy::new(3, 10))
    }

    fn unavailable() -> FetchError {
        FetchError::HttpStatus {
            status: 503,
            body: None,
        }
    }

    #[tokio::test]
    async fn test_valid_cache_skips_request() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock);
        fetcher
            .cache()
            .write()
            .await
            .set_cache("users-all", "cached".to_string(), None);
        let calls = AtomicU32::new(0);

        let value: String = fetcher
            .fetch_with_cache(
                OpClass::Users,
                "users-all",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok("fresh".to_string()) }
                },
                CacheOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(value, "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!crate::state::lock(fetcher.pipeline().state()).is_loading(OpClass::Users));
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores_with_ttl() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock);

        let value: String = fetcher
            .fetch_with_cache(
                OpClass::Posts,
                "posts-all",
                || async { Ok("fresh".to_string()) },
                CacheOptions::with_ttl(1_000),
            )
            .await
            .unwrap();

        assert_eq!(value, "fresh");
        let cache = fetcher.cache().read().await;
        assert_eq!(cache.entry("posts-all").map(|e| e.ttl), Some(1_000));
        assert!(cache.is_valid_cache("posts-all"));
    }

    #[tokio::test]
    async fn test_expired_entry_refetched() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock);
        fetcher
            .cache()
            .write()
            .await
            .set_cache("k", "old".to_string(), Some(100));
        clock.advance(100);

        let value: String = fetcher
            .fetch_with_cache(
                OpClass::Api,
                "k",
                || async { Ok("new".to_string()) },
                CacheOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(value, "new");
        assert_eq!(fetcher.cache().read().await.get_cache("k").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_bypass_and_no_update() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock);
        fetcher
            .cache()
            .write()
            .await
            .set_cache("k", "old".to_string(), None);

        let options = CacheOptions {
            use_cache: false,
            update_cache: false,
            ttl: None,
        };
        let value: String = fetcher
            .fetch_with_cache(OpClass::Api, "k", || async { Ok("new".to_string()) }, options)
            .await
            .unwrap();

        assert_eq!(value, "new");
        assert_eq!(fetcher.cache().read().await.get_cache("k").as_deref(), Some("old"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_propagates_without_stale_fallback() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock);
        fetcher
            .cache()
            .write()
            .await
            .set_cache("k", "stale".to_string(), Some(10));
        clock.advance(10);
        let calls = AtomicU32::new(0);

        let result: Result<String, _> = fetcher
            .fetch_with_cache(
                OpClass::Api,
                "k",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(unavailable()) }
                },
                CacheOptions::default(),
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), 503);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // The stale entry is left in place for callers that want it
        assert_eq!(fetcher.cache().read().await.get_cache("k").as_deref(), Some("stale"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_not_deduplicated_by_default() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock);
        let calls = AtomicU32::new(0);

        let request = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, FetchError>("x".to_string())
            }
        };

        let (a, b) = tokio::join!(
            fetcher.fetch_with_cache(OpClass::Api, "x", request, CacheOptions::default()),
            fetcher.fetch_with_cache(OpClass::Api, "x", request, CacheOptions::default()),
        );

        assert_eq!(a.unwrap(), "x");
        assert_eq!(b.unwrap(), "x");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_coalesces_concurrent_misses() {
        let clock = ManualClock::new(0);
        let fetcher = fetcher(&clock).with_single_flight();
        let calls = AtomicU32::new(0);

        let request = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, FetchError>("x".to_string())
            }
        };

        let (a, b) = tokio::join!(
            fetcher.fetch_with_cache(OpClass::Api, "x", request, CacheOptions::default()),
            fetcher.fetch_with_cache(OpClass::Api, "x", request, CacheOptions::default()),
        );

        assert_eq!(a.unwrap(), "x");
        assert_eq!(b.unwrap(), "x");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
