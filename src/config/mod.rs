//! Configuration Module - Optional TOML Configuration
//!
//! Loads `config.toml` when present. Every field has a default equal to
//! the server's fixed behavior, so running without a file is the normal
//! case.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::domain::DelayBounds;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  /// Listener and logging.
  #[serde(default)]
  pub server: ServerConfig,
  /// Bounds of the artificial delays.
  #[serde(default)]
  pub delays: DelayConfig,
}

/// Listener and logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
  /// Listener bind address.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
      log_level: default_log_level(),
    }
  }
}

/// Artificial delay bounds, in milliseconds (exclusive).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelayConfig {
  /// Bound for `/fast-random` and `/summary`.
  #[serde(default = "default_fast_max_ms")]
  pub fast_max_ms: u64,
  /// Bound for `/slow-random`.
  #[serde(default = "default_slow_max_ms")]
  pub slow_max_ms: u64,
}

impl Default for DelayConfig {
  fn default() -> Self {
    Self {
      fast_max_ms: default_fast_max_ms(),
      slow_max_ms: default_slow_max_ms(),
    }
  }
}

impl From<&DelayConfig> for DelayBounds {
  fn from(config: &DelayConfig) -> Self {
    Self {
      fast: Duration::from_millis(config.fast_max_ms),
      slow: Duration::from_millis(config.slow_max_ms),
    }
  }
}

// Default value functions for serde

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_fast_max_ms() -> u64 {
  500
}

fn default_slow_max_ms() -> u64 {
  2000
}
