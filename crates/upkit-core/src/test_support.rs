//! Fakes shared by the unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::builder::{UpdateBuilder, UpdateConfig};
use crate::callback::{ChannelListener, UpdateEvent};
use crate::checker::{FileChecker, IntegrityError};
use crate::config::UpkitConfig;
use crate::creator::FileCreator;
use crate::error::UpdateError;
use crate::executor::{CheckTask, DownloadTask, Executor, Rejected, TaskHandle};
use crate::model::Update;
use crate::worker::{CheckOutcome, CheckWorker, DownloadWorker, ProgressSink, TaskKind};

pub(crate) fn update(version: &str) -> Update {
    Update::new(10, version, format!("https://example.com/app-{}.pkg", version))
}

/// Settings that pass `build()` without touching XDG dirs.
pub(crate) fn settings(cache_dir: &Path) -> UpkitConfig {
    UpkitConfig {
        check_url: Some("https://updates.example.com/app.json".to_string()),
        cache_dir: Some(cache_dir.to_path_buf()),
        ..UpkitConfig::default()
    }
}

/// Builder whose listeners both feed the returned receiver.
pub(crate) fn observed_builder(
    settings: UpkitConfig,
) -> (UpdateBuilder, mpsc::UnboundedReceiver<UpdateEvent>) {
    let (listener, rx) = ChannelListener::new();
    let listener = Arc::new(listener);
    let builder = UpdateBuilder::new(settings)
        .check_listener(listener.clone())
        .download_listener(listener);
    (builder, rx)
}

pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<UpdateEvent>) -> Vec<UpdateEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

/// Check worker returning whatever the closure produces.
pub(crate) struct FnCheckWorker<F>(pub F);

impl<F> CheckWorker for FnCheckWorker<F>
where
    F: Fn() -> Result<CheckOutcome, UpdateError> + Send + Sync,
{
    fn check(&self, _config: &UpdateConfig) -> Result<CheckOutcome, UpdateError> {
        (self.0)()
    }
}

/// Check worker that blocks until released, so a test can hold the check slot.
pub(crate) struct GatedCheckWorker {
    release: Mutex<std::sync::mpsc::Receiver<()>>,
}

impl GatedCheckWorker {
    pub(crate) fn new() -> (Self, std::sync::mpsc::Sender<()>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (
            Self {
                release: Mutex::new(rx),
            },
            tx,
        )
    }
}

impl CheckWorker for GatedCheckWorker {
    fn check(&self, _config: &UpdateConfig) -> Result<CheckOutcome, UpdateError> {
        let _ = self.release.lock().unwrap().recv();
        Ok(CheckOutcome::UpToDate)
    }
}

/// Download worker that writes a fixed body to the target.
pub(crate) struct WriteDownloadWorker {
    pub(crate) body: Vec<u8>,
    pub(crate) calls: AtomicUsize,
}

impl WriteDownloadWorker {
    pub(crate) fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl DownloadWorker for WriteDownloadWorker {
    fn download(
        &self,
        _update: &Update,
        _config: &UpdateConfig,
        target: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), UpdateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| UpdateError::io(parent, e))?;
        }
        std::fs::write(target, &self.body).map_err(|e| UpdateError::io(target, e))?;
        progress.on_progress(self.body.len() as u64, Some(self.body.len() as u64));
        Ok(())
    }
}

/// Checker with a fixed verdict that counts its calls.
pub(crate) struct CountingChecker {
    pub(crate) accept: bool,
    pub(crate) calls: AtomicUsize,
}

impl CountingChecker {
    pub(crate) fn new(accept: bool) -> Self {
        Self {
            accept,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FileChecker for CountingChecker {
    fn check(&self, _update: &Update, _path: &Path) -> Result<(), IntegrityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.accept {
            Ok(())
        } else {
            Err(IntegrityError::DigestMismatch {
                expected: "aa".to_string(),
                actual: "bb".to_string(),
            })
        }
    }
}

/// Creator that always answers with the same path.
pub(crate) struct FixedCreator(pub Option<PathBuf>);

impl FileCreator for FixedCreator {
    fn create(&self, _version_name: &str) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Executor that records dispatches instead of running them.
#[derive(Default)]
pub(crate) struct FakeExecutor {
    pub(crate) check_running: AtomicBool,
    pub(crate) download_running: AtomicBool,
    /// Report idle from `is_running` but refuse in `check`/`download`, as after a lost race.
    pub(crate) refuse: AtomicBool,
    pub(crate) check_calls: AtomicUsize,
    pub(crate) download_calls: AtomicUsize,
    pub(crate) last_download: Mutex<Option<Update>>,
}

impl FakeExecutor {
    pub(crate) fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

impl Executor for FakeExecutor {
    fn is_running(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Check => self.check_running.load(Ordering::SeqCst),
            TaskKind::Download => self.download_running.load(Ordering::SeqCst),
        }
    }

    fn check(&self, task: CheckTask) -> Result<TaskHandle<CheckOutcome>, Rejected<CheckTask>> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Rejected(task));
        }
        let (done, handle) = TaskHandle::channel(TaskKind::Check);
        done.complete(Ok(CheckOutcome::UpToDate));
        Ok(handle)
    }

    fn download(&self, task: DownloadTask) -> Result<TaskHandle<PathBuf>, Rejected<DownloadTask>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Rejected(task));
        }
        *self.last_download.lock().unwrap() = Some(task.update.clone());
        let (done, handle) = TaskHandle::channel(TaskKind::Download);
        done.complete(Ok(PathBuf::from("/fake/download")));
        Ok(handle)
    }
}
