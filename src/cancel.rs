//! Cancellation coordination for in-flight lookups.
//!
//! A [`CancelToken`] is shared between a [`GeocodeTask`](crate::GeocodeTask)
//! and the transports it creates. Cancelling wakes every waiter exactly once
//! and stays set forever after.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cheaply cloneable cancellation flag with async wake-up.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a new, not yet cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Notifies all registered waiters exactly once.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until cancellation is requested. Returns immediately if already set.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel() is not missed.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
