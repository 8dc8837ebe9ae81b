//! Request/Response Pipeline
//!
//! Cross-cutting behaviour wrapped around every outbound call: loading
//! state, error state, failure classification and notification.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{ErrorCategory, Notification, NotificationSink};
use crate::error::{ApiError, FetchError, RequestFailed};
use crate::state::{self, OpClass, SharedState};

// == Pipeline ==
#[derive(Clone)]
pub struct Pipeline {
    state: SharedState,
    notifier: Arc<dyn NotificationSink>,
}

impl Pipeline {
    pub fn new(state: SharedState, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { state, notifier }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn notifier(&self) -> &Arc<dyn NotificationSink> {
        &self.notifier
    }

    // == Run ==
    /// Drives `call` (normally a retry sequence) through the pipeline.
    ///
    /// The loading flag for `op` is held for the whole call, retries
    /// included, and released even if the future is dropped. A terminal
    /// failure produces exactly one notification.
    pub async fn run<T, Fut>(&self, op: OpClass, call: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, RequestFailed>>,
    {
        let guard = LoadingGuard::begin(&self.state, op);
        let outcome = call.await;
        drop(guard);

        match outcome {
            Ok(value) => {
                state::lock(&self.state).clear_error(op);
                Ok(value)
            }
            Err(failed) => Err(self.fail(op, failed)),
        }
    }

    fn fail(&self, op: OpClass, failed: RequestFailed) -> ApiError {
        if let FetchError::Validation(message) = &failed.source {
            debug!(op = %op, "Passing validation error through");
            return ApiError::Validation(message.clone());
        }

        let category = ErrorCategory::classify(&failed);
        let message = match &failed.source {
            FetchError::HttpStatus { .. } => failed
                .source
                .server_message()
                .unwrap_or_else(|| category.message().to_string()),
            _ => category.message().to_string(),
        };

        warn!(
            op = %op,
            status = failed.status,
            attempts = failed.attempts,
            category = ?category,
            "Request failed: {}",
            failed.message
        );

        state::lock(&self.state).set_error(op, message.clone());
        self.notifier
            .notify(Notification::error(category.title(), message.clone()));

        ApiError::Request {
            category,
            title: category.title().to_string(),
            message,
            status: failed.status,
            payload: failed.payload,
            attempts: failed.attempts,
        }
    }
}

// == Loading Guard ==
/// Holds one loading count for an operation class until dropped.
struct LoadingGuard<'a> {
    state: &'a SharedState,
    op: OpClass,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a SharedState, op: OpClass) -> Self {
        state::lock(state).begin(op);
        Self { state, op }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        state::lock(self.state).end(self.op);
    }
}
