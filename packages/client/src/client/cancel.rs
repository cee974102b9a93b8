//! Cooperative cancellation signal

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// A clonable cancellation signal for in-flight async sends.
///
/// Triggering the token makes the awaiting send stop waiting and surface a
/// cancellation outcome, even before the engine acknowledges — the network
/// operation may continue briefly in the background.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    canceled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the signal. Idempotent.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::Acquire)
    }

    /// Resolves once the token has been triggered.
    pub async fn canceled(&self) {
        loop {
            if self.is_canceled() {
                return;
            }
            let notified = self.inner.notify.notified();
            // Re-check after registering to close the cancel/notify race.
            if self.is_canceled() {
                return;
            }
            notified.await;
        }
    }
}
