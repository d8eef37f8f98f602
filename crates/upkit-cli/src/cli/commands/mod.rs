//! CLI command handlers. Each command is in its own file.

mod check;
mod checksum;
mod download;
mod events;
mod verify;

pub use check::run_check;
pub use checksum::run_checksum;
pub use download::run_download;
pub use verify::run_verify;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use upkit_core::callback::{ChannelListener, UpdateEvent};
use upkit_core::config::UpkitConfig;
use upkit_core::worker::{JsonUpdateParser, UpdateParser};
use upkit_core::{Update, UpdateBuilder, UpdateConfig};

/// Reads and validates a JSON update manifest from disk.
pub(crate) fn read_manifest(path: &Path) -> Result<Update> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("read manifest {}", path.display()))?;
    let update = JsonUpdateParser
        .parse(&body)
        .with_context(|| format!("parse manifest {}", path.display()))?;
    Ok(update)
}

/// Builds the update config with both listeners feeding the returned channel.
pub(crate) fn build_observed(
    cfg: UpkitConfig,
) -> Result<(Arc<UpdateConfig>, UnboundedReceiver<UpdateEvent>)> {
    let (listener, rx) = ChannelListener::new();
    let listener = Arc::new(listener);
    let config = UpdateBuilder::new(cfg)
        .check_listener(listener.clone())
        .download_listener(listener)
        .build()
        .context("build update config")?;
    Ok((config, rx))
}
