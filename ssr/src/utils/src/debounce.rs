use std::sync::{Mutex, MutexGuard};

use tokio::task::JoinHandle;
use web_time::Duration;

/// Single-slot delayed task scheduler.
///
/// Scheduling a task always aborts whatever task is still waiting out its
/// delay, so at most one task is ever pending. Dropping the debouncer cancels
/// the pending task.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Mutex::new(None),
        }
    }

    /// Arm the timer for `task`, replacing any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        let mut slot = self.lock_slot();
        if let Some(pending) = slot.take() {
            if !pending.is_finished() {
                log::trace!("debounce: replacing pending task");
            }
            pending.abort();
        }

        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    /// Cancel the pending task, returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.lock_slot().take() {
            Some(pending) => {
                let waiting = !pending.is_finished();
                pending.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
