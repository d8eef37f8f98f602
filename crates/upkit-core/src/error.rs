//! Error types surfaced through callbacks and task handles.

use std::path::PathBuf;

use crate::checker::IntegrityError;
use crate::worker::TaskKind;

/// Failure of a check or download task.
///
/// Never returned from the dispatcher itself: every variant reaches the caller
/// through a listener or a [`TaskHandle`](crate::executor::TaskHandle).
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// A task of the same kind is already running.
    #[error("already have a {0} task running")]
    DuplicateTask(TaskKind),

    /// The builder was missing a collaborator or setting it needs.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport failure reported by libcurl.
    #[error("request failed: {0}")]
    Transport(#[from] curl::Error),

    /// Non-2xx response.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u32 },

    /// Update manifest could not be decoded.
    #[error("invalid update manifest: {0}")]
    Manifest(String),

    /// The file creator has no location for this version.
    #[error("no cache location for version {0}")]
    NoCacheLocation(String),

    /// Downloaded file did not pass the file checker.
    #[error("downloaded file failed verification: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Installer collaborator rejected the file.
    #[error("install failed: {0}")]
    Install(String),

    /// The worker or one of its callbacks panicked.
    #[error("{0} task panicked")]
    WorkerPanicked(TaskKind),

    /// The task was dropped without running or reporting (e.g. spawn failure).
    #[error("{0} task exited without a result")]
    WorkerLost(TaskKind),
}

impl UpdateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdateError::Io {
            path: path.into(),
            source,
        }
    }
}
