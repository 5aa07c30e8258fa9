//! Metrics Adapters
//!
//! Prometheus registry for the request instruments, plus the summary
//! collector the `prometheus` crate does not provide.

pub mod prometheus;
pub mod summary;

use thiserror::Error;

pub use self::prometheus::MetricsRegistry;
pub use self::summary::{Summary, SummaryOpts, SummaryVec};

/// Failures building, registering or rendering metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Invalid descriptor, duplicate registration or encoding failure.
    #[error("prometheus: {0}")]
    Prometheus(#[from] ::prometheus::Error),

    #[error("invalid summary objective {quantile}: {reason}")]
    InvalidObjective { quantile: f64, reason: &'static str },

    #[error("label {0:?} is reserved")]
    ReservedLabel(&'static str),

    #[error("expected {expected} label values, got {got}")]
    LabelCardinality { expected: usize, got: usize },

    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
