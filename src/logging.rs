//! Logging
//!
//! Installs the global `tracing` subscriber, optionally appending to a
//! per-day log file under the app's log directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{DomainError, DomainResult};

/// Directive used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Log file for today: `<dir>/<app>-YYYY-MM-DD.log`
pub fn log_file_path(log_dir: &Path, app_name: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    log_dir.join(format!("{}-{}.log", app_name, date))
}

/// Initialize logging. Returns the log file path when writing to a directory.
pub fn init_logger(log_dir: Option<&Path>, app_name: &str) -> DomainResult<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let Some(dir) = log_dir else {
        builder
            .try_init()
            .map_err(|e| DomainError::Internal(format!("failed to init logger: {}", e)))?;
        return Ok(None);
    };

    fs::create_dir_all(dir)
        .map_err(|e| DomainError::Internal(format!("create {}: {}", dir.display(), e)))?;
    let path = log_file_path(dir, app_name);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| DomainError::Internal(format!("open {}: {}", path.display(), e)))?;

    builder
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| DomainError::Internal(format!("failed to init logger: {}", e)))?;

    tracing::info!(app = app_name, path = %path.display(), "logger initialized");
    Ok(Some(path))
}
