//! Metrics Demo Server - Library Root
//!
//! Re-exports all modules for the binary, integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

/// Build version reported by the `version` gauge: `APP_VERSION` at
/// compile time, else the crate version.
pub const BUILD_VERSION: &str = match option_env!("APP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
