//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid config file: {}", path.display()))?;

  info!(
    bind = %config.server.bind_address,
    fast_max_ms = config.delays.fast_max_ms,
    slow_max_ms = config.delays.slow_max_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the defaults.
///
/// A file that exists but cannot be read or parsed is still an error.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
  if Path::new(path).exists() {
    load_config(path)
  } else {
    Ok(AppConfig::default())
  }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config TOML")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.server.bind_address.trim().is_empty(),
    "server.bind_address must not be empty"
  );

  anyhow::ensure!(
    config.delays.fast_max_ms > 0,
    "delays.fast_max_ms must be positive"
  );
  anyhow::ensure!(
    config.delays.slow_max_ms > 0,
    "delays.slow_max_ms must be positive"
  );
  anyhow::ensure!(
    config.delays.fast_max_ms <= config.delays.slow_max_ms,
    "delays.fast_max_ms ({}) must not exceed delays.slow_max_ms ({})",
    config.delays.fast_max_ms,
    config.delays.slow_max_ms
  );

  Ok(())
}
