//! Prometheus Metrics Registry - Request Observability
//!
//! Registers the four instruments the synthetic endpoints feed and
//! renders them in the text exposition format for `/metrics`.

use prometheus::core::Collector;
use prometheus::{Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::warn;

use super::MetricsError;
use super::summary::{SummaryOpts, SummaryVec};
use crate::domain::{DurationSink, Objective, RouteSpec};

/// Histogram bucket boundaries, in seconds.
pub const DURATION_BUCKETS: [f64; 9] = [0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.75, 1.0, 2.5];

/// Summary objectives: quantile and tolerated rank error.
pub const SUMMARY_OBJECTIVES: [Objective; 3] = [
    Objective::new(0.5, 0.05),
    Objective::new(0.9, 0.01),
    Objective::new(0.99, 0.001),
];

const DURATION_LABELS: [&str; 4] = ["code", "handler", "method", "endpoint"];

/// Process-wide request metrics.
///
/// Built once in `main` and shared by `Arc` with the router and the
/// scrape handler. Each instrument synchronizes internally; there is no
/// lock spanning instruments.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Build version gauge, always 1.
    pub version: Gauge,
    /// Requests by status code and method.
    pub requests_total: IntCounterVec,
    /// Request duration histogram (seconds).
    pub request_duration: HistogramVec,
    /// Request duration summary (seconds).
    pub request_summary_duration: SummaryVec,
}

impl MetricsRegistry {
    /// Create and register all metrics. `build_version` becomes the
    /// `version` label of the version gauge.
    pub fn new(build_version: &str) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let version = Gauge::with_opts(
            Opts::new("version", "Version information about this binary")
                .const_label("version", build_version),
        )?;
        version.set(1.0);

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Count of all HTTP requests"),
            &["code", "method"],
        )?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of all HTTP requests",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &DURATION_LABELS,
        )?;

        let request_summary_duration = SummaryVec::new(
            SummaryOpts::new(
                "http_request_summary_duration_seconds",
                "Summary of HTTP requests duration",
            )
            .objectives(SUMMARY_OBJECTIVES.to_vec()),
            &DURATION_LABELS,
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(request_summary_duration.clone()))?;
        registry.register(Box::new(version.clone()))?;

        Ok(Self {
            registry,
            version,
            requests_total,
            request_duration,
            request_summary_duration,
        })
    }

    /// Register an additional collector. Fails on a name collision.
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        self.registry.register(collector)?;
        Ok(())
    }

    /// Record one finished request on an instrumented route.
    ///
    /// Counts it once in `http_requests_total` and observes
    /// `elapsed_secs` into the route's duration sink.
    pub fn record_request(&self, route: &RouteSpec, method: &str, code: &str, elapsed_secs: f64) {
        self.requests_total.with_label_values(&[code, method]).inc();

        let labels = [code, route.handler, method, route.endpoint];
        match route.sink {
            DurationSink::Histogram => {
                self.request_duration
                    .with_label_values(&labels)
                    .observe(elapsed_secs);
            }
            DurationSink::Summary => {
                match self.request_summary_duration.get_metric_with_label_values(&labels) {
                    Ok(summary) => summary.observe(elapsed_secs),
                    Err(e) => warn!(error = %e, endpoint = route.endpoint, "Summary observation dropped"),
                }
            }
            DurationSink::Untimed => {}
        }
    }

    /// Render every registered metric in the text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
