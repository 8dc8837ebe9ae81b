//! Dashboard Refresh Task
//!
//! Background task that periodically reloads the dashboard so the cache
//! stays warm and stale fallbacks are noticed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::ApiService;

/// Spawns a background task that reloads the dashboard every
/// `refresh_interval_secs` seconds.
///
/// # Arguments
/// * `service` - Shared API service
/// * `refresh_interval_secs` - Interval in seconds between reloads
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let service = Arc::new(ApiService::new(&config, transport, session, notifier));
/// let refresh_handle = spawn_refresh_task(service.clone(), 30);
/// // Later, during shutdown:
/// refresh_handle.abort();
/// ```
pub fn spawn_refresh_task(service: Arc<ApiService>, refresh_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(refresh_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting dashboard refresh task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            match service.load_dashboard().await {
                Ok(fetched) if fetched.is_stale() => warn!(
                    users = fetched.data.total_users,
                    posts = fetched.data.total_posts,
                    cached_at = fetched.cached_at,
                    "Dashboard refreshed from stale cache"
                ),
                Ok(fetched) => info!(
                    users = fetched.data.total_users,
                    posts = fetched.data.total_posts,
                    "Dashboard refreshed"
                ),
                Err(err) => error!("Dashboard refresh failed: {}", err),
            }

            tokio::time::sleep(interval).await;
        }
    })
}
