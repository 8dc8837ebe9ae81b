//! Session provider contract used to attach auth context.

use async_trait::async_trait;

/// Supplies the bearer token of the current session, if any.
///
/// Lookups are best-effort: an error is logged by the caller and the
/// request goes out unauthenticated.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session_token(&self) -> anyhow::Result<Option<String>>;
}

/// Fixed token, typically read from configuration.
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: String,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session_token(&self) -> anyhow::Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// No signed-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    async fn current_session_token(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}
