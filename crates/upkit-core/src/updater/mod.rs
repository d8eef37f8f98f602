//! Dispatcher: the single entry point for check and download requests.
//!
//! Runs synchronously on the caller's thread and never blocks on a worker.
//! Every outcome, including "already running", is reported through the
//! request's callback; nothing is returned as an error.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::builder::UpdateConfig;
use crate::callback::{CheckCallback, DownloadCallback};
use crate::error::UpdateError;
use crate::executor::{CheckTask, DownloadTask, Executor, TaskHandle, UpdateExecutor};
use crate::model::Update;
use crate::worker::{CheckOutcome, TaskKind};

/// What `down_update` did with the request.
#[derive(Debug)]
pub enum DownloadDispatch {
    /// A verified package was already cached; no download was started.
    Cached(PathBuf),
    /// A download task was spawned; the handle resolves with the verified file.
    Started(TaskHandle<PathBuf>),
    /// A download was already running; the callback got `DuplicateTask`.
    Rejected,
}

/// Validates and forwards requests to an [`Executor`].
#[derive(Clone)]
pub struct Updater {
    executor: Arc<dyn Executor>,
}

impl Updater {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Process-wide dispatcher over [`UpdateExecutor::shared`], created on first use.
    pub fn shared() -> &'static Updater {
        static SHARED: OnceLock<Updater> = OnceLock::new();
        SHARED.get_or_init(|| Updater::new(UpdateExecutor::shared()))
    }

    /// Starts a check unless one is already running.
    ///
    /// Returns the task handle when dispatched; `None` when rejected, in which
    /// case the check listener has already received `DuplicateTask(Check)`.
    pub fn check_update(&self, config: &Arc<UpdateConfig>) -> Option<TaskHandle<CheckOutcome>> {
        let callback = CheckCallback::new(Arc::clone(config), self.clone());
        callback.on_check_start();

        if self.executor.is_running(TaskKind::Check) {
            tracing::error!("already have a check task running");
            callback.on_check_error(&UpdateError::DuplicateTask(TaskKind::Check));
            return None;
        }

        match self.executor.check(CheckTask::new(Arc::clone(config), callback)) {
            Ok(handle) => Some(handle),
            Err(rejected) => {
                tracing::error!("lost check dispatch race; already have a check task running");
                rejected
                    .into_inner()
                    .callback
                    .on_check_error(&UpdateError::DuplicateTask(TaskKind::Check));
                None
            }
        }
    }

    /// Reuses a verified cached package or starts a download.
    pub fn down_update(&self, update: &Update, config: &Arc<UpdateConfig>) -> DownloadDispatch {
        let callback = DownloadCallback::new(Arc::clone(config), update.clone());

        if let Some(cached) = usable_cache(update, config) {
            tracing::info!(path = %cached.display(), "using cached update package");
            callback.show_install_if_needed(&cached);
            return DownloadDispatch::Cached(cached);
        }

        if self.executor.is_running(TaskKind::Download) {
            tracing::error!("already have a download task running");
            callback.on_download_error(&UpdateError::DuplicateTask(TaskKind::Download));
            return DownloadDispatch::Rejected;
        }

        let task = DownloadTask::new(update.clone(), Arc::clone(config), callback);
        match self.executor.download(task) {
            Ok(handle) => DownloadDispatch::Started(handle),
            Err(rejected) => {
                tracing::error!(
                    "lost download dispatch race; already have a download task running"
                );
                rejected
                    .into_inner()
                    .callback
                    .on_download_error(&UpdateError::DuplicateTask(TaskKind::Download));
                DownloadDispatch::Rejected
            }
        }
    }
}

/// Cache path for `update` if a file there passes the checker.
///
/// Any checker failure means "no usable cache" and falls through to a download.
fn usable_cache(update: &Update, config: &UpdateConfig) -> Option<PathBuf> {
    let path = config.file_creator().create(&update.version_name)?;
    if !path.exists() {
        return None;
    }
    match config.file_checker().check(update, &path) {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::debug!(path = %path.display(), "cached package unusable, downloading: {}", e);
            None
        }
    }
}
