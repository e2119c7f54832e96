//! Tracing setup: filtered, non-blocking file logging.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "stockdb_client=info";

/// Directory for log files.
pub fn log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("stockdb-client").join("logs"))
}

/// Build the filter: RUST_LOG wins, then the configured level, then the default.
pub fn filter(configured: Option<&str>) -> EnvFilter {
  if let Ok(filter) = EnvFilter::try_from_default_env() {
    return filter;
  }
  EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER))
    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines get flushed.
pub fn init(configured: Option<&str>) -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "stockdb-client.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(filter(configured))
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}
