//! Cooperative shutdown signal usable as a deadline source.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct SignalState {
    fired: AtomicBool,
    reason: RwLock<Option<String>>,
    notify: Notify,
}

/// A cloneable signal that ends a shutdown wait when fired.
///
/// Firing is idempotent - only the first reason is kept. Clones share state.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    state: Arc<SignalState>,
}

impl ShutdownSignal {
    /// Creates a new, unfired signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal with a reason, waking every waiter.
    pub fn cancel(&self, reason: impl Into<String>) {
        // First reason wins
        if self
            .state
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.state.reason.write() = Some(reason.into());
            self.state.notify.notify_waiters();
        }
    }

    /// Returns whether the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.fired.load(Ordering::SeqCst)
    }

    /// Returns the reason the signal fired with, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.state.reason.read().clone()
    }

    /// Waits until the signal fires. Returns immediately if it already has.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}
