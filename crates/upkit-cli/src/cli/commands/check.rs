//! `upkit check` – ask the manifest endpoint for a newer version.

use anyhow::{bail, Context, Result};
use upkit_core::config::UpkitConfig;
use upkit_core::worker::CheckOutcome;
use upkit_core::Updater;

use super::build_observed;
use super::download::finish_download;

pub async fn run_check(
    mut cfg: UpkitConfig,
    url: Option<String>,
    current_version: Option<u64>,
    download: bool,
) -> Result<()> {
    if let Some(url) = url {
        cfg.check_url = Some(url);
    }
    if let Some(code) = current_version {
        cfg.current_version_code = code;
    }
    if cfg.check_url.is_none() {
        bail!("no manifest URL: pass --url or set check_url in the config");
    }
    if download {
        cfg.strategy.auto_download = true;
    }

    let (config, mut rx) = build_observed(cfg)?;
    let Some(handle) = Updater::shared().check_update(&config) else {
        bail!("an update check is already running");
    };

    let update = match handle.wait().await.context("update check failed")? {
        CheckOutcome::UpToDate => {
            println!("Already up to date.");
            return Ok(());
        }
        CheckOutcome::Available(update) => update,
    };

    if config.is_ignored(&update) {
        println!("Update {} is on the ignore list.", update.version_name);
        return Ok(());
    }
    println!(
        "Update available: {} (code {}){}",
        update.version_name,
        update.version_code,
        if update.force { " [required]" } else { "" }
    );
    if !update.content.is_empty() {
        println!("{}", update.content);
    }
    if !(config.strategy().auto_download || update.force) {
        println!("Run with --download to fetch it.");
        return Ok(());
    }

    // The check callback already dispatched the download, which holds its own
    // copy of the config; release ours so the channel closes when it is done.
    drop(config);
    finish_download(&mut rx, None).await
}
