//! Logging init: append to a file under the XDG state dir, or fall back to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `UPKIT_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info,upkit_core=debug,upkit=debug";

/// Env var checked before `RUST_LOG`.
pub const LOG_ENV: &str = "UPKIT_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/upkit/upkit.log`; the directory is created if missing.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("upkit").context("resolve XDG dirs")?;
    dirs.place_state_file("upkit.log")
        .context("create log directory")
}

/// Installs the global subscriber writing to [`log_file_path`].
/// Returns Err (e.g. state dir unwritable) so the caller can use [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("upkit logging to {}", path.display());
    Ok(())
}

/// Stderr-only logging. Never fails; a subscriber installed earlier wins.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
