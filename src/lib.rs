//! Resilient Fetch - client-side data-fetch resilience layer
//!
//! Caches API responses with TTL expiry, retries transient failures with
//! exponential backoff, invalidates related entries on mutations and lets
//! callers fall back to stale data when a refetch fails.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod state;
pub mod tasks;

pub use api::ApiService;
pub use config::Config;
pub use error::{ApiError, Result};
pub use tasks::spawn_refresh_task;
