//! Completion handle returned for every dispatched task.

use tokio::sync::oneshot;

use crate::error::UpdateError;
use crate::worker::TaskKind;

/// Resolves once the task finished and its callback ran.
#[derive(Debug)]
pub struct TaskHandle<T> {
    kind: TaskKind,
    rx: oneshot::Receiver<Result<T, UpdateError>>,
}

/// Sending half of a [`TaskHandle`]; held by whoever runs the task.
#[derive(Debug)]
pub struct TaskCompletion<T> {
    tx: oneshot::Sender<Result<T, UpdateError>>,
}

impl<T> TaskCompletion<T> {
    pub fn complete(self, result: Result<T, UpdateError>) {
        // The caller may have dropped the handle; fire-and-forget is allowed.
        let _ = self.tx.send(result);
    }
}

impl<T> TaskHandle<T> {
    /// A linked completion/handle pair for `kind`.
    pub fn channel(kind: TaskKind) -> (TaskCompletion<T>, TaskHandle<T>) {
        let (tx, rx) = oneshot::channel();
        (TaskCompletion { tx }, TaskHandle { kind, rx })
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Wait for the task's result.
    pub async fn wait(self) -> Result<T, UpdateError> {
        let kind = self.kind;
        self.rx
            .await
            .unwrap_or_else(|_| Err(UpdateError::WorkerLost(kind)))
    }

    /// Blocking form of [`wait`](Self::wait). Must not be called from an async context.
    pub fn wait_blocking(self) -> Result<T, UpdateError> {
        let kind = self.kind;
        self.rx
            .blocking_recv()
            .unwrap_or_else(|_| Err(UpdateError::WorkerLost(kind)))
    }
}
