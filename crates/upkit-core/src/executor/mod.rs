//! Task executor: owns the authoritative running-state per task kind and
//! runs bound workers on background threads.
//!
//! Acquiring a slot is a single compare-and-swap, so of two racing requests
//! for the same kind exactly one is spawned and the other gets its task back
//! as [`Rejected`].

mod handle;
mod slot;
mod task;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::thread;

use crate::error::UpdateError;
use crate::worker::{CheckOutcome, TaskKind};

use self::slot::{SlotGuard, TaskSlot};

pub use handle::{TaskCompletion, TaskHandle};
pub use task::{CheckTask, DownloadTask};

use self::task::Job;

/// A task the executor refused because one of the same kind is running.
pub struct Rejected<T>(pub T);

impl<T> Rejected<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rejected(..)")
    }
}

/// Schedules check and download tasks, at most one running per kind.
pub trait Executor: Send + Sync {
    /// Whether a task of `kind` is currently running.
    fn is_running(&self, kind: TaskKind) -> bool;

    fn check(&self, task: CheckTask) -> Result<TaskHandle<CheckOutcome>, Rejected<CheckTask>>;

    fn download(&self, task: DownloadTask) -> Result<TaskHandle<PathBuf>, Rejected<DownloadTask>>;
}

/// Thread-per-task executor with one slot per kind.
#[derive(Debug, Default)]
pub struct UpdateExecutor {
    check: Arc<TaskSlot>,
    download: Arc<TaskSlot>,
}

impl UpdateExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance, created on first use.
    pub fn shared() -> Arc<UpdateExecutor> {
        static SHARED: OnceLock<Arc<UpdateExecutor>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(UpdateExecutor::new())))
    }

    fn slot(&self, kind: TaskKind) -> &Arc<TaskSlot> {
        match kind {
            TaskKind::Check => &self.check,
            TaskKind::Download => &self.download,
        }
    }

    fn spawn<J: Job>(kind: TaskKind, guard: SlotGuard, job: J) -> TaskHandle<J::Output> {
        let (done, handle) = TaskHandle::channel(kind);
        let mut pending = Pending::new(kind, job);
        let spawned = thread::Builder::new()
            .name(format!("upkit-{}", kind))
            .spawn(move || {
                let Some(job) = pending.take() else {
                    return;
                };
                let result = job.run();
                // Release before signalling so a waiter can dispatch the next task immediately.
                drop(guard);
                done.complete(result);
            });
        if let Err(e) = spawned {
            // The closure is dropped: the slot is freed, the callback gets
            // WorkerLost from `Pending` and the handle resolves to WorkerLost.
            tracing::error!("failed to spawn {} worker thread: {}", kind, e);
        }
        handle
    }
}

/// Holds a task until it runs; a task dropped unrun is abandoned with `WorkerLost`.
struct Pending<J: Job> {
    kind: TaskKind,
    job: Option<J>,
}

impl<J: Job> Pending<J> {
    fn new(kind: TaskKind, job: J) -> Self {
        Self {
            kind,
            job: Some(job),
        }
    }

    fn take(&mut self) -> Option<J> {
        self.job.take()
    }
}

impl<J: Job> Drop for Pending<J> {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            tracing::warn!("{} task dropped before it ran", self.kind);
            job.abandon(&UpdateError::WorkerLost(self.kind));
        }
    }
}

impl Executor for UpdateExecutor {
    fn is_running(&self, kind: TaskKind) -> bool {
        self.slot(kind).is_running()
    }

    fn check(&self, task: CheckTask) -> Result<TaskHandle<CheckOutcome>, Rejected<CheckTask>> {
        let Some(guard) = self.slot(TaskKind::Check).try_acquire() else {
            return Err(Rejected(task));
        };
        tracing::debug!("check task started");
        Ok(Self::spawn(TaskKind::Check, guard, task))
    }

    fn download(&self, task: DownloadTask) -> Result<TaskHandle<PathBuf>, Rejected<DownloadTask>> {
        let Some(guard) = self.slot(TaskKind::Download).try_acquire() else {
            return Err(Rejected(task));
        };
        tracing::debug!(version = %task.update.version_name, "download task started");
        Ok(Self::spawn(TaskKind::Download, guard, task))
    }
}

#[cfg(test)]
mod tests;
