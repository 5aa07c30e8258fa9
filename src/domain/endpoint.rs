//! Synthetic endpoints and their fixed behavior.
//!
//! Every endpoint is a pure function of nothing: a status, a body and,
//! for the random ones, an upper bound on an artificial delay. The HTTP
//! adapter turns these into axum handlers.

use std::time::Duration;

/// Where an instrumented route records its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSink {
    /// `http_request_duration_seconds` histogram.
    Histogram,
    /// `http_request_summary_duration_seconds` summary.
    Summary,
    /// Counted only; no duration is observed.
    Untimed,
}

/// Labels fixed per route at startup plus its duration sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    /// Value of the `handler` label.
    pub handler: &'static str,
    /// Value of the `endpoint` label (the route path).
    pub endpoint: &'static str,
    /// Instrument receiving the elapsed time.
    pub sink: DurationSink,
}

/// Upper bounds for the two random-delay endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayBounds {
    /// Exclusive bound for `/fast-random` and `/summary`.
    pub fast: Duration,
    /// Exclusive bound for `/slow-random`.
    pub slow: Duration,
}

impl Default for DelayBounds {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(500),
            slow: Duration::from_millis(2000),
        }
    }
}

/// The six synthetic endpoints served besides `/metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Stable,
    FastRandom,
    SlowRandom,
    Summary,
    NotFound,
    InternalError,
}

const STABLE_BODY: &str = "Endpoint estável";
const FAST_BODY: &str = "Endpoint com resposta aleatória (0-0.5s)";
const SLOW_BODY: &str = "Endpoint com resposta aleatória (0-2s)";

impl Endpoint {
    /// All endpoints in routing order.
    pub const ALL: [Self; 6] = [
        Self::Stable,
        Self::FastRandom,
        Self::SlowRandom,
        Self::Summary,
        Self::NotFound,
        Self::InternalError,
    ];

    /// Exact-match route path.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Stable => "/",
            Self::FastRandom => "/fast-random",
            Self::SlowRandom => "/slow-random",
            Self::Summary => "/summary",
            Self::NotFound => "/error",
            Self::InternalError => "/internal-error",
        }
    }

    /// HTTP status the endpoint always answers with.
    pub const fn status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InternalError => 500,
            _ => 200,
        }
    }

    /// Fixed response body; empty for the simulated failures.
    pub const fn body(self) -> &'static str {
        match self {
            Self::Stable => STABLE_BODY,
            Self::FastRandom | Self::Summary => FAST_BODY,
            Self::SlowRandom => SLOW_BODY,
            Self::NotFound | Self::InternalError => "",
        }
    }

    /// Exclusive upper bound of the artificial delay, if any.
    pub const fn delay_bound(self, bounds: &DelayBounds) -> Option<Duration> {
        match self {
            Self::FastRandom | Self::Summary => Some(bounds.fast),
            Self::SlowRandom => Some(bounds.slow),
            _ => None,
        }
    }

    /// Instrumentation labels and sink for this endpoint's route.
    ///
    /// The simulated failures are counted but not timed, and `/summary`
    /// is timed into the summary instead of the histogram.
    pub const fn route_spec(self) -> RouteSpec {
        let (handler, sink) = match self {
            Self::Stable | Self::FastRandom | Self::SlowRandom => ("found", DurationSink::Histogram),
            Self::Summary => ("found", DurationSink::Summary),
            Self::NotFound => ("not_found", DurationSink::Untimed),
            Self::InternalError => ("internal_error", DurationSink::Untimed),
        };
        RouteSpec {
            handler,
            endpoint: self.path(),
            sink,
        }
    }
}
