//! Metrics Demo Server - Entry Point
//!
//! Serves synthetic endpoints with fixed and randomly delayed responses,
//! instrumented with Prometheus request metrics, until the process is
//! killed or the listener fails.
//!
//! Wiring sequence:
//! 1. Load config.toml if present (defaults otherwise) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build and register the metrics registry
//! 4. Seed the shared delay generator from the clock
//! 5. Bind :8080 and serve; any listener failure is fatal

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use metrics_demo_server::BUILD_VERSION;
use metrics_demo_server::adapters::delay::SeededDelay;
use metrics_demo_server::adapters::http::{self, AppState};
use metrics_demo_server::adapters::metrics::MetricsRegistry;
use metrics_demo_server::config;
use metrics_demo_server::domain::DelayBounds;
use metrics_demo_server::ports::DelaySource;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration (optional file) ───────────────
    let config = config::loader::load_or_default("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.server.log_level)
                }),
        )
        .json()
        .init();

    info!(
        version = BUILD_VERSION,
        bind = %config.server.bind_address,
        fast_max_ms = config.delays.fast_max_ms,
        slow_max_ms = config.delays.slow_max_ms,
        "Starting metrics demo server"
    );

    // ── 3. Metrics registry (name collisions are fatal) ─────
    let metrics = Arc::new(
        MetricsRegistry::new(BUILD_VERSION)
            .inspect_err(|e| error!(error = %e, "Metric registration failed"))
            .context("Failed to register metrics")?,
    );

    // ── 4. Shared delay generator ───────────────────────────
    let delays: Arc<dyn DelaySource> = Arc::new(SeededDelay::from_clock());
    let state = AppState::new(metrics, delays, DelayBounds::from(&config.delays));

    // ── 5. Bind & serve ─────────────────────────────────────
    let listener = http::bind(&config.server.bind_address)
        .await
        .inspect_err(|e| error!(error = %e, "Listener failed to start"))?;

    http::serve(listener, http::create_router(state))
        .await
        .inspect_err(|e| error!(error = %e, "Listener failed"))?;

    Ok(())
}
