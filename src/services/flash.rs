use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::models::StatusMessage;

/// How long a success message stays up unless configured otherwise.
pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_secs(3);

#[derive(Default)]
struct Slot {
    generation: u64,
    message: Option<StatusMessage>,
}

/// The transient status line of a dashboard. Success messages clear themselves after
/// `clear_after`; errors stay until replaced.
///
/// The clear timer is a spawned task owned by the `Flash`. Setting any newer message
/// aborts it, and so does dropping the `Flash`, so a timer never touches a message it
/// was not scheduled for.
pub struct Flash {
    slot: Arc<Mutex<Slot>>,
    clear_after: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Flash {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            clear_after,
            timer: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<StatusMessage> {
        lock(&self.slot).message.clone()
    }

    pub fn success(&self, text: impl Into<String>) {
        let generation = self.replace(Some(StatusMessage::success(text)));

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime available, success message will not auto-clear");
            return;
        };

        let slot = Arc::clone(&self.slot);
        let delay = self.clear_after;
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut slot = lock(&slot);
            if slot.generation == generation {
                slot.message = None;
            }
        });
        *lock(&self.timer) = Some(task);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.replace(Some(StatusMessage::error(text)));
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    /// Drops the current message only if it is an error.
    pub fn clear_error(&self) {
        let is_error = lock(&self.slot)
            .message
            .as_ref()
            .is_some_and(StatusMessage::is_error);
        if is_error {
            self.clear();
        }
    }

    /// Aborts a pending clear timer, if any.
    pub fn cancel_timer(&self) {
        if let Some(task) = lock(&self.timer).take() {
            task.abort();
        }
    }

    fn replace(&self, message: Option<StatusMessage>) -> u64 {
        self.cancel_timer();
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        slot.message = message;
        slot.generation
    }
}

impl Drop for Flash {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
