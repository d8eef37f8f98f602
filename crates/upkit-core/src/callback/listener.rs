//! Caller-facing notification hooks.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::error::UpdateError;
use crate::model::Update;

/// Receives check lifecycle events. All methods default to no-ops.
pub trait CheckListener: Send + Sync {
    fn on_check_start(&self) {}
    fn has_update(&self, _update: &Update) {}
    fn no_update(&self) {}
    fn on_check_error(&self, _error: &UpdateError) {}
    /// A non-forced update whose version the user chose to skip.
    fn on_check_ignore(&self, _update: &Update) {}
}

/// Receives download lifecycle events. All methods default to no-ops.
pub trait DownloadListener: Send + Sync {
    fn on_download_start(&self) {}
    fn on_download_progress(&self, _current: u64, _total: Option<u64>) {}
    fn on_download_complete(&self, _file: &Path) {}
    fn on_download_error(&self, _error: &UpdateError) {}
    /// A verified package is ready and should be offered for installation.
    fn on_install_ready(&self, _update: &Update, _file: &Path) {}
    /// The installer accepted the package.
    fn on_installed(&self, _update: &Update, _file: &Path) {}
}

/// Mirrors every event into the log. Used when no listener is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogListener;

impl CheckListener for LogListener {
    fn on_check_start(&self) {
        tracing::info!("checking for updates");
    }

    fn has_update(&self, update: &Update) {
        tracing::info!(version = %update.version_name, force = update.force, "update available");
    }

    fn no_update(&self) {
        tracing::info!("no update available");
    }

    fn on_check_error(&self, error: &UpdateError) {
        tracing::warn!("update check failed: {}", error);
    }

    fn on_check_ignore(&self, update: &Update) {
        tracing::info!(version = %update.version_name, "update ignored");
    }
}

impl DownloadListener for LogListener {
    fn on_download_start(&self) {
        tracing::info!("downloading update");
    }

    fn on_download_complete(&self, file: &Path) {
        tracing::info!(path = %file.display(), "update downloaded");
    }

    fn on_download_error(&self, error: &UpdateError) {
        tracing::warn!("update download failed: {}", error);
    }

    fn on_install_ready(&self, update: &Update, file: &Path) {
        tracing::info!(
            version = %update.version_name,
            path = %file.display(),
            "update ready to install"
        );
    }

    fn on_installed(&self, update: &Update, file: &Path) {
        tracing::info!(
            version = %update.version_name,
            path = %file.display(),
            "update installed"
        );
    }
}

/// Owned copy of a listener event, for channel subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    CheckStarted,
    UpdateAvailable(Update),
    NoUpdate,
    UpdateIgnored(Update),
    CheckFailed(String),
    DownloadStarted,
    DownloadProgress { current: u64, total: Option<u64> },
    DownloadComplete(PathBuf),
    DownloadFailed(String),
    InstallReady { update: Update, file: PathBuf },
    Installed { update: Update, file: PathBuf },
}

impl UpdateEvent {
    /// True for events after which no further events follow for that request
    /// (unless the strategy starts a download on its own).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpdateEvent::NoUpdate
                | UpdateEvent::UpdateIgnored(_)
                | UpdateEvent::CheckFailed(_)
                | UpdateEvent::DownloadFailed(_)
                | UpdateEvent::InstallReady { .. }
                | UpdateEvent::Installed { .. }
        )
    }
}

/// Forwards events into an unbounded channel. Send errors (receiver gone) are ignored.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<UpdateEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UpdateEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: UpdateEvent) {
        let _ = self.tx.send(event);
    }
}

impl CheckListener for ChannelListener {
    fn on_check_start(&self) {
        self.send(UpdateEvent::CheckStarted);
    }

    fn has_update(&self, update: &Update) {
        self.send(UpdateEvent::UpdateAvailable(update.clone()));
    }

    fn no_update(&self) {
        self.send(UpdateEvent::NoUpdate);
    }

    fn on_check_error(&self, error: &UpdateError) {
        self.send(UpdateEvent::CheckFailed(error.to_string()));
    }

    fn on_check_ignore(&self, update: &Update) {
        self.send(UpdateEvent::UpdateIgnored(update.clone()));
    }
}

impl DownloadListener for ChannelListener {
    fn on_download_start(&self) {
        self.send(UpdateEvent::DownloadStarted);
    }

    fn on_download_progress(&self, current: u64, total: Option<u64>) {
        self.send(UpdateEvent::DownloadProgress { current, total });
    }

    fn on_download_complete(&self, file: &Path) {
        self.send(UpdateEvent::DownloadComplete(file.to_path_buf()));
    }

    fn on_download_error(&self, error: &UpdateError) {
        self.send(UpdateEvent::DownloadFailed(error.to_string()));
    }

    fn on_install_ready(&self, update: &Update, file: &Path) {
        self.send(UpdateEvent::InstallReady {
            update: update.clone(),
            file: file.to_path_buf(),
        });
    }

    fn on_installed(&self, update: &Update, file: &Path) {
        self.send(UpdateEvent::Installed {
            update: update.clone(),
            file: file.to_path_buf(),
        });
    }
}
