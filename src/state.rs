//! Loading and error state per operation class.
//!
//! Written by the request pipeline, read by UI collaborators. Nothing in
//! the fetch layer branches on it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

/// Request state shared between the pipeline and its readers.
pub type SharedState = Arc<Mutex<RequestState>>;

// == Operation Class ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpClass {
    Api,
    Users,
    Posts,
    Dashboard,
}

impl OpClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpClass::Api => "api",
            OpClass::Users => "users",
            OpClass::Posts => "posts",
            OpClass::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for OpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Request State ==
#[derive(Debug, Default)]
pub struct RequestState {
    /// In-flight calls per class; overlapping calls each hold one count
    loading: HashMap<OpClass, u32>,
    errors: HashMap<OpClass, String>,
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedState {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn begin(&mut self, op: OpClass) {
        *self.loading.entry(op).or_insert(0) += 1;
    }

    pub fn end(&mut self, op: OpClass) {
        if let Some(count) = self.loading.get_mut(&op) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.loading.remove(&op);
            }
        }
    }

    pub fn is_loading(&self, op: OpClass) -> bool {
        self.loading.contains_key(&op)
    }

    pub fn any_loading(&self) -> bool {
        !self.loading.is_empty()
    }

    pub fn set_error(&mut self, op: OpClass, message: impl Into<String>) {
        self.errors.insert(op, message.into());
    }

    pub fn clear_error(&mut self, op: OpClass) {
        self.errors.remove(&op);
    }

    pub fn last_error(&self, op: OpClass) -> Option<&str> {
        self.errors.get(&op).map(String::as_str)
    }
}

/// Locks shared state, recovering from a poisoned lock.
///
/// The state is plain counters and strings, so a panic mid-update cannot
/// leave it unusable.
pub fn lock(state: &SharedState) -> MutexGuard<'_, RequestState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_counts_overlapping_calls() {
        let mut state = RequestState::new();
        state.begin(OpClass::Posts);
        state.begin(OpClass::Posts);
        state.end(OpClass::Posts);

        assert!(state.is_loading(OpClass::Posts));
        state.end(OpClass::Posts);
        assert!(!state.is_loading(OpClass::Posts));
        assert!(!state.any_loading());
    }

    #[test]
    fn test_end_without_begin_is_noop() {
        let mut state = RequestState::new();
        state.end(OpClass::Users);
        assert!(!state.is_loading(OpClass::Users));
    }

    #[test]
    fn test_error_overwritten_and_cleared() {
        let mut state = RequestState::new();
        state.set_error(OpClass::Users, "first");
        state.set_error(OpClass::Users, "second");
        assert_eq!(state.last_error(OpClass::Users), Some("second"));
        assert!(state.last_error(OpClass::Posts).is_none());

        state.clear_error(OpClass::Users);
        assert!(state.last_error(OpClass::Users).is_none());
    }
}
