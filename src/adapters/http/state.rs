//! Shared state handed to every handler via `State<AppState>`.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::DelayBounds;
use crate::ports::DelaySource;

#[derive(Clone)]
pub struct AppState {
    /// Request metrics, also rendered by `/metrics`.
    pub metrics: Arc<MetricsRegistry>,
    /// Random latency for the delayed endpoints.
    pub delays: Arc<dyn DelaySource>,
    /// Upper bounds for those delays.
    pub bounds: DelayBounds,
}

impl AppState {
    /// Bundle the registry, delay source and bounds for the router.
    pub fn new(metrics: Arc<MetricsRegistry>, delays: Arc<dyn DelaySource>, bounds: DelayBounds) -> Self {
        Self {
            metrics,
            delays,
            bounds,
        }
    }

    /// Sleep for a random duration below `max`, yielding the task.
    pub async fn pause(&self, max: Duration) {
        let delay = self.delays.draw(max);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
