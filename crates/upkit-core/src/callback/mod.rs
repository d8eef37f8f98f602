//! Default callbacks built by the dispatcher for every request.
//!
//! They adapt task results into listener notifications and apply the
//! configured strategy (ignore list, auto-download, auto-install).

mod listener;

use std::path::Path;
use std::sync::Arc;

use crate::builder::UpdateConfig;
use crate::error::UpdateError;
use crate::model::Update;
use crate::updater::Updater;
use crate::worker::{CheckOutcome, ProgressSink};

pub use listener::{
    ChannelListener, CheckListener, DownloadListener, LogListener, UpdateEvent,
};

/// Check callback bound to one request's config.
pub struct CheckCallback {
    config: Arc<UpdateConfig>,
    updater: Updater,
}

impl CheckCallback {
    /// `updater` is used to start the download when the strategy asks for it.
    pub fn new(config: Arc<UpdateConfig>, updater: Updater) -> Self {
        Self { config, updater }
    }

    pub fn on_check_start(&self) {
        self.config.check_listener().on_check_start();
    }

    pub fn on_check_error(&self, error: &UpdateError) {
        tracing::debug!("check reported error: {}", error);
        self.config.check_listener().on_check_error(error);
    }

    /// Delivers the worker's result.
    pub fn complete(&self, result: &Result<CheckOutcome, UpdateError>) {
        match result {
            Ok(CheckOutcome::Available(update)) => self.has_update(update),
            Ok(CheckOutcome::UpToDate) => self.config.check_listener().no_update(),
            Err(e) => self.on_check_error(e),
        }
    }

    fn has_update(&self, update: &Update) {
        let listener = self.config.check_listener();
        if self.config.is_ignored(update) {
            tracing::debug!(version = %update.version_name, "version is on the ignore list");
            listener.on_check_ignore(update);
            return;
        }
        listener.has_update(update);
        if update.force || self.config.strategy().auto_download {
            // Fire-and-forget; the outcome reaches the download listener.
            let _ = self.updater.down_update(update, &self.config);
        }
    }
}

/// Download callback bound to one request's config and update.
pub struct DownloadCallback {
    config: Arc<UpdateConfig>,
    update: Update,
}

impl DownloadCallback {
    pub fn new(config: Arc<UpdateConfig>, update: Update) -> Self {
        Self { config, update }
    }

    pub fn on_download_start(&self) {
        self.config.download_listener().on_download_start();
    }

    pub fn on_download_error(&self, error: &UpdateError) {
        tracing::debug!(version = %self.update.version_name, "download reported error: {}", error);
        self.config.download_listener().on_download_error(error);
    }

    pub fn on_download_complete(&self, file: &Path) {
        self.config.download_listener().on_download_complete(file);
        self.show_install_if_needed(file);
    }

    /// Installs directly when auto-install is on and an installer is configured,
    /// otherwise tells the listener the package is ready.
    pub fn show_install_if_needed(&self, file: &Path) {
        let listener = self.config.download_listener();
        match self.config.installer() {
            Some(installer) if self.config.strategy().auto_install => {
                match installer.install(&self.update, file) {
                    Ok(()) => listener.on_installed(&self.update, file),
                    Err(e) => self.on_download_error(&e),
                }
            }
            _ => listener.on_install_ready(&self.update, file),
        }
    }
}

impl ProgressSink for DownloadCallback {
    fn on_progress(&self, current: u64, total: Option<u64>) {
        self.config
            .download_listener()
            .on_download_progress(current, total);
    }
}
