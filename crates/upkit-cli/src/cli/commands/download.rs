//! `upkit download` – fetch the package a manifest describes.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use upkit_core::callback::UpdateEvent;
use upkit_core::config::UpkitConfig;
use upkit_core::executor::TaskHandle;
use upkit_core::{DownloadDispatch, Updater};

use super::events;
use super::{build_observed, read_manifest};

pub async fn run_download(cfg: UpkitConfig, manifest: &Path) -> Result<()> {
    let update = read_manifest(manifest)?;
    let (config, mut rx) = build_observed(cfg)?;

    let dispatch = Updater::shared().down_update(&update, &config);
    // Tasks hold their own copy; dropping ours lets the channel close once they are gone.
    drop(config);

    let handle = match dispatch {
        DownloadDispatch::Cached(path) => {
            println!("Using cached package {}", path.display());
            None
        }
        DownloadDispatch::Started(handle) => Some(handle),
        DownloadDispatch::Rejected => None,
    };
    finish_download(&mut rx, handle).await
}

/// Waits for the download (or cached hand-off) to settle and reports it.
///
/// Callers must not hold the config feeding `rx`, otherwise a task that dies
/// without a final event leaves this waiting forever.
pub(crate) async fn finish_download(
    rx: &mut UnboundedReceiver<UpdateEvent>,
    handle: Option<TaskHandle<PathBuf>>,
) -> Result<()> {
    match events::follow(rx).await {
        Some(UpdateEvent::InstallReady { update, file }) => {
            println!(
                "Update {} ready to install: {}",
                update.version_name,
                file.display()
            );
        }
        Some(UpdateEvent::Installed { update, .. }) => {
            println!("Update {} installed.", update.version_name);
        }
        Some(UpdateEvent::DownloadFailed(msg)) => bail!("download failed: {}", msg),
        Some(other) => tracing::debug!("download settled with {:?}", other),
        None => {
            // The channel closed without a final event; the handle knows why.
            if let Some(handle) = handle {
                handle.wait().await?;
            }
            bail!("download ended without a result");
        }
    }
    Ok(())
}
