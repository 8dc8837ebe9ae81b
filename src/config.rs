//! Configuration Module
//!
//! Handles loading and managing client configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::client::RetryPolicy;

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL every request path is resolved against
    pub api_base_url: String,
    /// Default cache TTL in milliseconds
    pub cache_ttl_ms: u64,
    /// Cache capacity, 0 = unbounded
    pub cache_max_entries: usize,
    /// Retries after the first attempt for reads
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub retry_base_delay_ms: u64,
    /// Transport-level timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Dashboard refresh interval in seconds
    pub refresh_interval: u64,
    /// Coalesce concurrent misses for the same key
    pub single_flight: bool,
    /// Bearer token attached to every request
    pub api_token: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Base URL (default: http://localhost:3000/api)
    /// - `CACHE_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity, 0 for unbounded (default: 0)
    /// - `MAX_RETRIES` - Read retries (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - Backoff base in milliseconds (default: 1000)
    /// - `REQUEST_TIMEOUT_MS` - Transport timeout in milliseconds (default: 10000)
    /// - `REFRESH_INTERVAL` - Dashboard refresh in seconds (default: 30)
    /// - `SINGLE_FLIGHT` - `true`/`1` to coalesce concurrent misses (default: false)
    /// - `API_TOKEN` - Optional bearer token
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            cache_ttl_ms: parse_var("CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(defaults.cache_max_entries),
            max_retries: parse_var("MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS")
                .unwrap_or(defaults.retry_base_delay_ms),
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            refresh_interval: parse_var("REFRESH_INTERVAL").unwrap_or(defaults.refresh_interval),
            single_flight: env::var("SINGLE_FLIGHT")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.single_flight),
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Retry policy for reads. Mutations never retry.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            cache_ttl_ms: crate::cache::DEFAULT_TTL_MS,
            cache_max_entries: 0,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            request_timeout_ms: 10_000,
            refresh_interval: 30,
            single_flight: false,
            api_token: None,
        }
    }
}

/// Reads and parses `name`; unparsable values fall back to the default.
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value {:?} for {}", raw, name);
            None
        }
    }
}
