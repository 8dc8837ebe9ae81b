//! Resilient Fetch - headless dashboard client
//!
//! Keeps the dashboard data warm against a configured API, logging fresh
//! loads, stale fallbacks and classified failures.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resilient_fetch::client::{
    NoSession, ReqwestTransport, SessionProvider, StaticSession, TracingNotifier,
};
use resilient_fetch::{spawn_refresh_task, ApiService, Config};

/// Main entry point for the dashboard client.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the HTTP transport and session provider
/// 4. Create the API service with its cache
/// 5. Start the background dashboard refresh task
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resilient_fetch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resilient Fetch dashboard client");

    let config = Config::from_env();
    info!(
        "Configuration loaded: api={}, ttl={}ms, retries={}, refresh={}s, single_flight={}",
        config.api_base_url,
        config.cache_ttl_ms,
        config.max_retries,
        config.refresh_interval,
        config.single_flight
    );

    let transport = ReqwestTransport::new(config.api_base_url.clone(), config.request_timeout())
        .context("Failed to build HTTP transport")?;
    let session: Arc<dyn SessionProvider> = match &config.api_token {
        Some(token) => Arc::new(StaticSession::new(token.clone())),
        None => Arc::new(NoSession),
    };

    let service = Arc::new(ApiService::new(
        &config,
        Arc::new(transport),
        session,
        Arc::new(TracingNotifier),
    ));
    info!("API service initialized");

    let refresh_handle = spawn_refresh_task(service.clone(), config.refresh_interval);
    info!("Background refresh task started");

    shutdown_signal(refresh_handle).await;

    let stats = service.cache_stats().await;
    info!(
        "Shutdown complete: entries={}, hits={}, misses={}, hit_rate={:.2}",
        stats.total_entries,
        stats.hits,
        stats.misses,
        stats.hit_rate()
    );
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the refresh task.
async fn shutdown_signal(refresh_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    refresh_handle.abort();
    warn!("Refresh task aborted");
}
