//! Request Executor
//!
//! Bounded retry with exponential backoff for transient HTTP failures.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{FetchError, RequestFailed};

/// Status codes treated as transient by default.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

// == Retry Policy ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub base_delay_ms: u64,
    pub retryable_status_codes: HashSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            ..Self::default()
        }
    }

    /// Single attempt. Mutations use this so a failed write is never replayed.
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    // == Should Retry ==
    /// Whether a failure on 0-indexed `attempt` earns another try.
    ///
    /// Only responses with a retryable status are retried; transport,
    /// decode and validation failures fail fast.
    pub fn should_retry(&self, attempt: u32, error: &FetchError) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        match error {
            FetchError::HttpStatus { status, .. } => self.retryable_status_codes.contains(status),
            FetchError::Transport(_) | FetchError::Decode(_) | FetchError::Validation(_) => false,
        }
    }

    // == Delay ==
    /// Backoff before retrying after 0-indexed `attempt`:
    /// `base_delay_ms * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

// == Execute Request ==
/// Runs `request_fn` until it succeeds or the policy gives up.
///
/// `request_fn` is invoked at most `max_retries + 1` times. The returned
/// [`RequestFailed`] describes the last attempt. There is no cancellation:
/// dropping the returned future is the only way to stop a retry sequence.
pub async fn execute_request<T, F, Fut>(
    mut request_fn: F,
    policy: &RetryPolicy,
) -> Result<T, RequestFailed>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt: u32 = 0;

    loop {
        match request_fn().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if policy.should_retry(attempt, &err) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying request: {}",
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                debug!(attempts = attempt + 1, "Request failed: {}", err);
                return Err(RequestFailed::from_attempt(err, attempt + 1));
            }
        }
    }
}
