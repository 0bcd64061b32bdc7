//! # Edit Coalescer
//!
//! Debounces rapid property edits into one mutation per quiescence window.
//!
//! The coalescer is a single-slot register: scheduling while an update is
//! pending replaces it (last write wins, updates are not merged) and restarts
//! the window.

use crate::ElementUpdate;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default quiescence window
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(300);

/// Update waiting for the quiescence window to elapse
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub uid: String,
    pub update: ElementUpdate,
}

/// Invoked with the surviving update once the window elapses
pub type ApplyFn = Arc<dyn Fn(PendingUpdate) + Send + Sync>;

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<PendingUpdate>,
    timer: Option<JoinHandle<()>>,
}

pub struct EditCoalescer {
    window: Duration,
    apply: ApplyFn,
    slot: Arc<Mutex<Slot>>,
}

impl EditCoalescer {
    pub fn new(window: Duration, apply: ApplyFn) -> Self {
        Self {
            window,
            apply,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `update` for `uid`, superseding any pending update.
    ///
    /// Must be called within a tokio runtime.
    pub fn schedule(&self, uid: impl Into<String>, update: ElementUpdate) {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        let generation = slot.generation;

        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        if let Some(superseded) = slot.pending.replace(PendingUpdate {
            uid: uid.into(),
            update,
        }) {
            tracing::debug!("Superseded pending update for {}", superseded.uid);
        }

        let shared = Arc::clone(&self.slot);
        let apply = Arc::clone(&self.apply);
        let window = self.window;
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;

            let pending = {
                let mut slot = lock(&shared);
                if slot.generation != generation {
                    return;
                }
                slot.timer = None;
                slot.pending.take()
            };

            if let Some(pending) = pending {
                apply(pending);
            }
        }));
    }

    /// Apply the pending update now; returns whether there was one
    pub fn flush(&self) -> bool {
        let pending = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
            slot.pending.take()
        };

        match pending {
            Some(pending) => {
                (self.apply)(pending);
                true
            }
            None => false,
        }
    }

    /// Drop the pending update; returns whether there was one
    pub fn cancel(&self) -> bool {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }
}

impl Drop for EditCoalescer {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.slot).timer.take() {
            timer.abort();
        }
    }
}

// A panicking apply callback must not wedge the register
fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
