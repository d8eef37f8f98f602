//! Per-kind running flag with atomic acquire and RAII release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Running-state of one task kind. Only the executor transitions it.
#[derive(Debug, Default)]
pub(super) struct TaskSlot {
    running: AtomicBool,
}

impl TaskSlot {
    pub(super) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Idle → Running in one step. `None` if another task already holds the slot.
    pub(super) fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard {
                slot: Arc::clone(self),
            })
    }
}

/// Returns the slot to Idle when dropped, including when the worker panics.
#[derive(Debug)]
pub(super) struct SlotGuard {
    slot: Arc<TaskSlot>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.running.store(false, Ordering::Release);
    }
}
