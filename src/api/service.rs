//! API Service
//!
//! Domain reads and writes for users and posts, built on the cached
//! fetcher, the invalidator and the pipeline.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{CacheKey, CacheStats, CacheStore, Clock, SharedCache, SystemClock};
use crate::client::{
    execute_request, HttpClient, Method, Notification, NotificationSink, Pipeline, RetryPolicy,
    SessionProvider, Transport,
};
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::fetch::{CacheOptions, CacheValue, CachedFetcher, Invalidator, ResourceChange};
use crate::models::{
    DashboardData, Fetched, NewPost, NewUser, Payload, Post, PostUpdate, User, UserUpdate,
};
use crate::state::{self, OpClass, RequestState, SharedState};

/// Resource name for users in cache keys
pub const USERS: &str = "users";
/// Resource name for posts in cache keys
pub const POSTS: &str = "posts";

// == Api Service ==
/// Entry point for UI callers.
///
/// Owns its cache and request state; construct one per session and share
/// it by `Arc`.
pub struct ApiService {
    http: HttpClient,
    fetcher: CachedFetcher<Payload>,
    invalidator: Invalidator<Payload>,
    /// Writes are never replayed
    mutation_policy: RetryPolicy,
}

impl ApiService {
    // == Constructor ==
    /// Creates a service on the wall clock.
    pub fn new(
        config: &Config,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_clock(config, transport, session, notifier, Arc::new(SystemClock))
    }

    /// Creates a service whose cache reads time from `clock`.
    pub fn with_clock(
        config: &Config,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProvider>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut store = CacheStore::with_clock(config.cache_ttl_ms, clock);
        if config.cache_max_entries > 0 {
            store = store.with_max_entries(config.cache_max_entries);
        }
        let cache = store.shared();

        let pipeline = Pipeline::new(RequestState::shared(), notifier);
        let mut fetcher = CachedFetcher::new(cache.clone(), pipeline, config.retry_policy());
        if config.single_flight {
            fetcher = fetcher.with_single_flight();
        }

        Self {
            http: HttpClient::new(transport, session),
            fetcher,
            invalidator: Invalidator::new(cache),
            mutation_policy: RetryPolicy::none(),
        }
    }

    // == Accessors ==
    pub fn cache(&self) -> &SharedCache<Payload> {
        self.fetcher.cache()
    }

    pub fn state(&self) -> &SharedState {
        self.fetcher.pipeline().state()
    }

    pub fn is_loading(&self, op: OpClass) -> bool {
        state::lock(self.state()).is_loading(op)
    }

    pub fn last_error(&self, op: OpClass) -> Option<String> {
        state::lock(self.state()).last_error(op).map(str::to_string)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache().read().await.stats()
    }

    pub async fn clear_cache(&self) {
        self.cache().write().await.clear_cache();
    }

    // == Users ==
    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.list_users(OpClass::Users).await
    }

    pub async fn get_user(&self, id: u64) -> Result<User> {
        let http = &self.http;
        let url = format!("/users/{}", id);
        self.fetcher
            .fetch_with_cache(
                OpClass::Users,
                CacheKey::by_id(USERS, id).as_str(),
                || http.get::<User>(&url),
                CacheOptions::default(),
            )
            .await
    }

    pub async fn create_user(&self, new_user: &NewUser) -> Result<User> {
        let http = &self.http;
        let user: User = self
            .mutate(OpClass::Users, || async move {
                if let Some(message) = new_user.validate() {
                    return Err(FetchError::Validation(message));
                }
                http.send_json(Method::Post, "/users", Some(new_user)).await
            })
            .await?;

        self.invalidator
            .invalidate(&[ResourceChange::new(USERS).id(user.id)])
            .await;
        self.notify_success("User created", format!("{} was added", user.name));
        Ok(user)
    }

    pub async fn update_user(&self, id: u64, update: &UserUpdate) -> Result<User> {
        let http = &self.http;
        let url = format!("/users/{}", id);
        let user: User = self
            .mutate(OpClass::Users, || http.send_json(Method::Put, &url, Some(update)))
            .await?;

        self.invalidator
            .invalidate(&[ResourceChange::new(USERS).id(id)])
            .await;
        self.notify_success("User updated", format!("{} was saved", user.name));
        Ok(user)
    }

    /// Deletes a user. The user's post list is invalidated along with the
    /// user keys, and so is the full post list, which may have lost posts.
    pub async fn delete_user(&self, id: u64) -> Result<()> {
        let http = &self.http;
        let url = format!("/users/{}", id);
        let _: Value = self
            .mutate(OpClass::Users, || {
                http.send_json::<Value, Value>(Method::Delete, &url, None)
            })
            .await?;

        self.invalidator
            .invalidate(&[
                ResourceChange::new(USERS).id(id),
                ResourceChange::new(POSTS).param("userId", id),
            ])
            .await;
        self.notify_success("User deleted", format!("User {} was removed", id));
        Ok(())
    }

    // == Posts ==
    pub async fn get_posts(&self) -> Result<Vec<Post>> {
        self.list_posts(OpClass::Posts).await
    }

    pub async fn get_posts_by_user(&self, user_id: u64) -> Result<Vec<Post>> {
        let http = &self.http;
        let url = format!("/posts?userId={}", user_id);
        self.fetcher
            .fetch_with_cache(
                OpClass::Posts,
                CacheKey::with_params(POSTS, [("userId", user_id)]).as_str(),
                || http.get::<Vec<Post>>(&url),
                CacheOptions::default(),
            )
            .await
    }

    pub async fn get_post(&self, id: u64) -> Result<Post> {
        let http = &self.http;
        let url = format!("/posts/{}", id);
        self.fetcher
            .fetch_with_cache(
                OpClass::Posts,
                CacheKey::by_id(POSTS, id).as_str(),
                || http.get::<Post>(&url),
                CacheOptions::default(),
            )
            .await
    }

    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post> {
        let http = &self.http;
        let post: Post = self
            .mutate(OpClass::Posts, || async move {
                if let Some(message) = new_post.validate() {
                    return Err(FetchError::Validation(message));
                }
                http.send_json(Method::Post, "/posts", Some(new_post)).await
            })
            .await?;

        self.invalidator
            .invalidate(&[ResourceChange::new(POSTS)
                .id(post.id)
                .param("userId", post.user_id)])
            .await;
        self.notify_success("Post created", format!("\"{}\" was published", post.title));
        Ok(post)
    }

    /// Updates a post, invalidating the author lists of both the previous
    /// version (when it is cached) and the returned one.
    pub async fn update_post(&self, id: u64, update: &PostUpdate) -> Result<Post> {
        let previous_author = self.cached_post(id).await.map(|p| p.user_id);
        let http = &self.http;
        let url = format!("/posts/{}", id);
        let url = url.as_str();
        let post: Post = self
            .mutate(OpClass::Posts, || async move {
                if let Some(message) = update.validate() {
                    return Err(FetchError::Validation(message));
                }
                http.send_json(Method::Put, url, Some(update)).await
            })
            .await?;

        let mut change = ResourceChange::new(POSTS)
            .id(id)
            .param("userId", post.user_id);
        if let Some(author) = previous_author.filter(|a| *a != post.user_id) {
            change = change.param("userId", author);
        }
        self.invalidator.invalidate(&[change]).await;
        self.notify_success("Post updated", format!("\"{}\" was saved", post.title));
        Ok(post)
    }

    /// Deletes a post. The author's list is only invalidated when the post
    /// can be found in the cache, expired or not.
    pub async fn delete_post(&self, id: u64) -> Result<()> {
        let author = self.cached_post(id).await.map(|p| p.user_id);
        let http = &self.http;
        let url = format!("/posts/{}", id);
        let _: Value = self
            .mutate(OpClass::Posts, || {
                http.send_json::<Value, Value>(Method::Delete, &url, None)
            })
            .await?;

        let mut change = ResourceChange::new(POSTS).id(id);
        if let Some(author) = author {
            change = change.param("userId", author);
        }
        self.invalidator.invalidate(&[change]).await;
        self.notify_success("Post deleted", format!("Post {} was removed", id));
        Ok(())
    }

    // == Dashboard ==
    /// Loads users and posts for the dashboard.
    ///
    /// When a refetch fails but an expired entry is still cached, the stale
    /// data is served and the result is marked [`crate::models::DataSource::Stale`].
    /// Errors only propagate when there is nothing cached to fall back to.
    pub async fn load_dashboard(&self) -> Result<Fetched<DashboardData>> {
        let (users, posts) = tokio::join!(
            self.list_users(OpClass::Dashboard),
            self.list_posts(OpClass::Dashboard),
        );

        // Both halves share the Dashboard error slot, so a success that
        // finished last may have cleared the other half's failure
        if let Some(err) = users.as_ref().err().or(posts.as_ref().err()) {
            state::lock(self.state()).set_error(OpClass::Dashboard, err.message());
        }

        let users = self.or_stale(&CacheKey::all(USERS), users).await?;
        let posts = self.or_stale(&CacheKey::all(POSTS), posts).await?;

        // Report the oldest stale entry
        let cached_at = match (users.cached_at, posts.cached_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let dashboard = DashboardData::new(users.data, posts.data);

        Ok(match cached_at {
            Some(at) => Fetched::stale(dashboard, at),
            None => Fetched::live(dashboard),
        })
    }

    // == Helpers ==
    async fn list_users(&self, op: OpClass) -> Result<Vec<User>> {
        let http = &self.http;
        self.fetcher
            .fetch_with_cache(
                op,
                CacheKey::all(USERS).as_str(),
                || http.get::<Vec<User>>("/users"),
                CacheOptions::default(),
            )
            .await
    }

    async fn list_posts(&self, op: OpClass) -> Result<Vec<Post>> {
        let http = &self.http;
        self.fetcher
            .fetch_with_cache(
                op,
                CacheKey::all(POSTS).as_str(),
                || http.get::<Vec<Post>>("/posts"),
                CacheOptions::default(),
            )
            .await
    }

    /// Runs a write through the pipeline with a single attempt.
    async fn mutate<T, F, Fut>(&self, op: OpClass, request_fn: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, FetchError>>,
    {
        self.fetcher
            .pipeline()
            .run(op, execute_request(request_fn, &self.mutation_policy))
            .await
    }

    /// Falls back to whatever is cached under `key` when `result` failed.
    async fn or_stale<T>(&self, key: &CacheKey, result: Result<T>) -> Result<Fetched<T>>
    where
        T: CacheValue<Payload>,
    {
        let err = match result {
            Ok(data) => return Ok(Fetched::live(data)),
            Err(err) => err,
        };

        let cache = self.cache().read().await;
        let stale = cache
            .entry(key.as_str())
            .and_then(|entry| T::from_value(&entry.data).map(|data| (data, entry.timestamp)));

        match stale {
            Some((data, cached_at)) => {
                warn!(key = %key, "Serving stale cache after failed refetch: {}", err);
                Ok(Fetched::stale(data, cached_at))
            }
            None => Err(err),
        }
    }

    /// Looks a post up in the cache, ignoring validity: by id first, then in
    /// the cached full list.
    async fn cached_post(&self, id: u64) -> Option<Post> {
        let cache = self.cache().read().await;
        if let Some(Payload::Post(post)) = cache.get_cache(CacheKey::by_id(POSTS, id).as_str()) {
            return Some(post);
        }
        match cache.get_cache(CacheKey::all(POSTS).as_str()) {
            Some(Payload::Posts(posts)) => posts.into_iter().find(|p| p.id == id),
            _ => None,
        }
    }

    fn notify_success(&self, title: &str, message: String) {
        info!("{}: {}", title, message);
        self.fetcher
            .pipeline()
            .notifier()
            .notify(Notification::success(title, message));
    }
}
