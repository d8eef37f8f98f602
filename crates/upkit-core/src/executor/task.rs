//! Workers bound to their configuration and callback, ready to run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use crate::builder::UpdateConfig;
use crate::callback::{CheckCallback, DownloadCallback};
use crate::error::UpdateError;
use crate::model::Update;
use crate::worker::{CheckOutcome, CheckWorker, DownloadWorker, TaskKind};

/// A check worker bound to its config and callback.
pub struct CheckTask {
    pub worker: Arc<dyn CheckWorker>,
    pub config: Arc<UpdateConfig>,
    pub callback: CheckCallback,
}

impl CheckTask {
    pub fn new(config: Arc<UpdateConfig>, callback: CheckCallback) -> Self {
        Self {
            worker: config.check_worker(),
            config,
            callback,
        }
    }

    /// Runs the worker on the current thread and delivers the result to the callback.
    ///
    /// A panic in the worker or in the callback is reported as `WorkerPanicked`.
    pub fn run(self) -> Result<CheckOutcome, UpdateError> {
        let ran = catch_unwind(AssertUnwindSafe(|| {
            let result = self.worker.check(&self.config);
            self.callback.complete(&result);
            result
        }));
        let report = |e: &UpdateError| self.callback.on_check_error(e);
        ran.unwrap_or_else(|_| Err(report_panic(TaskKind::Check, report)))
    }
}

impl Job for CheckTask {
    type Output = CheckOutcome;

    fn run(self) -> Result<CheckOutcome, UpdateError> {
        CheckTask::run(self)
    }

    fn abandon(self, error: &UpdateError) {
        self.callback.on_check_error(error);
    }
}

/// A download worker bound to the update, its config and callback.
pub struct DownloadTask {
    pub worker: Arc<dyn DownloadWorker>,
    pub update: Update,
    pub config: Arc<UpdateConfig>,
    pub callback: DownloadCallback,
}

impl DownloadTask {
    pub fn new(update: Update, config: Arc<UpdateConfig>, callback: DownloadCallback) -> Self {
        Self {
            worker: config.download_worker(),
            update,
            config,
            callback,
        }
    }

    /// Downloads, verifies and reports. A file that fails verification is deleted.
    ///
    /// A panic anywhere in the run, including the install hand-off, is reported
    /// as `WorkerPanicked`.
    pub fn run(self) -> Result<PathBuf, UpdateError> {
        let ran = catch_unwind(AssertUnwindSafe(|| {
            self.callback.on_download_start();
            let result = self.fetch();
            match &result {
                Ok(path) => self.callback.on_download_complete(path),
                Err(e) => self.callback.on_download_error(e),
            }
            result
        }));
        let report = |e: &UpdateError| self.callback.on_download_error(e);
        ran.unwrap_or_else(|_| Err(report_panic(TaskKind::Download, report)))
    }

    fn fetch(&self) -> Result<PathBuf, UpdateError> {
        let version = &self.update.version_name;
        let target = self
            .config
            .file_creator()
            .create(version)
            .ok_or_else(|| UpdateError::NoCacheLocation(version.clone()))?;

        self.worker
            .download(&self.update, &self.config, &target, &self.callback)?;

        if let Err(e) = self.config.file_checker().check(&self.update, &target) {
            tracing::warn!(path = %target.display(), "downloaded package rejected: {}", e);
            if let Err(rm) = std::fs::remove_file(&target) {
                tracing::debug!("could not remove rejected package: {}", rm);
            }
            return Err(e.into());
        }
        Ok(target)
    }
}

impl Job for DownloadTask {
    type Output = PathBuf;

    fn run(self) -> Result<PathBuf, UpdateError> {
        DownloadTask::run(self)
    }

    fn abandon(self, error: &UpdateError) {
        self.callback.on_download_error(error);
    }
}

/// A bound task the executor either runs or gives up on.
pub(crate) trait Job: Send + 'static {
    type Output: Send + 'static;

    fn run(self) -> Result<Self::Output, UpdateError>;

    /// Reports `error` through the task's callback when it will never run.
    fn abandon(self, error: &UpdateError);
}

fn report_panic(kind: TaskKind, report: impl FnOnce(&UpdateError)) -> UpdateError {
    tracing::error!("{} task panicked", kind);
    let error = UpdateError::WorkerPanicked(kind);
    if catch_unwind(AssertUnwindSafe(|| report(&error))).is_err() {
        tracing::error!("{} callback panicked while reporting a panic", kind);
    }
    error
}
