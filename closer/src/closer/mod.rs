//! The shutdown coordinator.
//!
//! A [`Closer`] owns an insertion-ordered registry of [`Releaser`]s and runs
//! them exactly once when shutdown is requested:
//!
//! - Registration is accepted only while the closer is open.
//! - The first `close` call flips a one-shot latch, snapshots the registry and
//!   starts a detached driver task that runs every releaser.
//! - Every `close` call races the driver's completion signal against its own
//!   deadline. A caller whose deadline fires first gets
//!   [`CloserError::DeadlineExceeded`]; releasers keep running.
//! - Once closed, further `close` calls return `Ok(())` immediately.

mod builder;
mod releaser;
mod runner;
mod state;

pub use builder::CloserBuilder;
pub use releaser::Releaser;
pub use state::{CloseState, ReleaseSummary};

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{CloserConfig, ExecutionOrder};
use crate::deadline::Deadline;
use crate::errors::{CloserError, ReleaseResult};
use crate::reporter::FailureReporter;

struct Inner {
    id: Uuid,
    order: ExecutionOrder,
    state: AtomicU8,
    releasers: Mutex<Vec<Releaser>>,
    reporter: RwLock<Arc<dyn FailureReporter>>,
    deadline: RwLock<Deadline>,
    reporter_replaced: AtomicBool,
    deadline_replaced: AtomicBool,
    in_flight: AtomicUsize,
    failed: AtomicUsize,
    done: watch::Sender<bool>,
    summary: Mutex<Option<ReleaseSummary>>,
}

impl Inner {
    fn state(&self) -> CloseState {
        CloseState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn finish(&self, summary: ReleaseSummary) {
        info!(
            closer_id = %self.id,
            total = summary.total,
            failed = summary.failed,
            elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            "Shutdown complete"
        );
        *self.summary.lock() = Some(summary);
        self.state.store(CloseState::Closed as u8, Ordering::SeqCst);
        self.done.send_replace(true);
    }
}

/// Registry of resource releasers run exactly once at shutdown.
///
/// Cloning is cheap; clones share the same registry and latch.
#[derive(Clone)]
pub struct Closer {
    inner: Arc<Inner>,
}

impl Closer {
    /// Creates a closer with the default settings: parallel execution, no
    /// deadline, failures written to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for a customized closer.
    #[must_use]
    pub fn builder() -> CloserBuilder {
        CloserBuilder::new()
    }

    /// Creates a closer from declarative configuration.
    #[must_use]
    pub fn from_config(config: &CloserConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    fn from_parts(
        order: ExecutionOrder,
        releasers: Vec<Releaser>,
        reporter: Arc<dyn FailureReporter>,
        deadline: Deadline,
    ) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                order,
                state: AtomicU8::new(CloseState::Open as u8),
                releasers: Mutex::new(releasers),
                reporter: RwLock::new(reporter),
                deadline: RwLock::new(deadline),
                reporter_replaced: AtomicBool::new(false),
                deadline_replaced: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
                done,
                summary: Mutex::new(None),
            }),
        }
    }

    /// Returns the closer's unique id, attached to its logs and failures.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Returns the configured execution order.
    #[must_use]
    pub fn order(&self) -> ExecutionOrder {
        self.inner.order
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CloseState {
        self.inner.state()
    }

    /// Returns the number of releasers waiting for shutdown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.releasers.lock().len()
    }

    /// Returns true if no releaser is waiting for shutdown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.releasers.lock().is_empty()
    }

    /// Returns the number of releasers still running during shutdown.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the shutdown summary once every releaser has finished.
    #[must_use]
    pub fn summary(&self) -> Option<ReleaseSummary> {
        *self.inner.summary.lock()
    }

    /// Registers a blocking release function.
    ///
    /// Registrations after shutdown started are dropped with a warning.
    pub fn add<F>(&self, release: F)
    where
        F: FnOnce() -> ReleaseResult + Send + 'static,
    {
        self.register(Releaser::unnamed(release));
    }

    /// Registers a releaser.
    ///
    /// Registrations after shutdown started are dropped with a warning.
    pub fn register(&self, releaser: Releaser) {
        if let Err(e) = self.try_register(releaser) {
            warn!(closer_id = %self.inner.id, "{}", e);
        }
    }

    /// Registers a releaser, failing with [`CloserError::Closing`] once
    /// shutdown has started.
    pub fn try_register(&self, releaser: Releaser) -> Result<(), CloserError> {
        let mut releasers = self.inner.releasers.lock();
        let label = releaser.label(releasers.len());
        // Checked under the registry lock so shutdown's snapshot sees every accepted entry
        if self.inner.state() != CloseState::Open {
            return Err(CloserError::Closing(label));
        }
        debug!(closer_id = %self.inner.id, releaser = %label, "Registered releaser");
        releasers.push(releaser);
        Ok(())
    }

    /// Replaces the failure reporter.
    ///
    /// Only the first replacement wins, and only while the closer is open.
    /// Returns whether the reporter was replaced.
    pub fn replace_reporter(&self, reporter: Arc<dyn FailureReporter>) -> bool {
        let mut current = self.inner.reporter.write();
        if self.inner.state() != CloseState::Open
            || self.inner.reporter_replaced.swap(true, Ordering::SeqCst)
        {
            debug!(closer_id = %self.inner.id, "Ignoring reporter replacement");
            return false;
        }
        *current = reporter;
        true
    }

    /// Replaces the default deadline used by [`close`](Self::close).
    ///
    /// Only the first replacement wins, and only while the closer is open.
    /// Returns whether the deadline was replaced.
    pub fn replace_deadline(&self, deadline: impl Into<Deadline>) -> bool {
        let mut current = self.inner.deadline.write();
        if self.inner.state() != CloseState::Open
            || self.inner.deadline_replaced.swap(true, Ordering::SeqCst)
        {
            debug!(closer_id = %self.inner.id, "Ignoring deadline replacement");
            return false;
        }
        *current = deadline.into();
        true
    }

    /// Returns a clone of the default deadline.
    #[must_use]
    pub fn default_deadline(&self) -> Deadline {
        self.inner.deadline.read().clone()
    }

    /// Runs every registered releaser, waiting at most the default deadline.
    pub async fn close(&self) -> Result<(), CloserError> {
        let deadline = self.default_deadline();
        self.close_with(deadline).await
    }

    /// Runs every registered releaser, waiting at most `deadline`.
    ///
    /// The release body runs once per closer no matter how many callers race
    /// here. A caller arriving while releasers are still running waits for
    /// them, bounded by its own deadline. A caller arriving after shutdown
    /// finished returns `Ok(())` immediately.
    ///
    /// Releasers run on the runtime of the caller that started shutdown. If
    /// that runtime shuts down first, unfinished releasers are abandoned and
    /// counted as failed; the closer still reaches [`CloseState::Closed`].
    pub async fn close_with(&self, deadline: impl Into<Deadline>) -> Result<(), CloserError> {
        if self.state() == CloseState::Closed {
            return Ok(());
        }
        // Must precede the latch: without a runtime the closer stays open
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CloserError::NoRuntime)?;
        let deadline = deadline.into();
        self.begin_shutdown(&runtime);
        self.wait(&deadline).await
    }

    /// Waits until shutdown has completed, without starting or bounding it.
    pub async fn wait_closed(&self) -> ReleaseSummary {
        let mut done = self.inner.done.subscribe();
        // The sender lives in `inner`, so the channel never closes while we hold `self`
        let _ = done.wait_for(|finished| *finished).await;
        self.summary().unwrap_or_default()
    }

    /// Flips the latch and starts the driver. A no-op for every caller but
    /// the first.
    fn begin_shutdown(&self, runtime: &tokio::runtime::Handle) {
        if self
            .inner
            .state
            .compare_exchange(
                CloseState::Open as u8,
                CloseState::Closing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return;
        }

        let releasers = std::mem::take(&mut *self.inner.releasers.lock());
        let reporter = self.inner.reporter.read().clone();
        self.inner.in_flight.store(releasers.len(), Ordering::SeqCst);

        info!(
            closer_id = %self.inner.id,
            releasers = releasers.len(),
            order = %self.inner.order,
            "Shutdown started"
        );

        if releasers.is_empty() {
            self.inner.finish(ReleaseSummary::default());
        } else {
            let completion = runner::Completion::new(self.inner.clone(), releasers.len());
            runtime.spawn(runner::drive(completion, releasers, reporter));
        }
    }

    async fn wait(&self, deadline: &Deadline) -> Result<(), CloserError> {
        let mut done = self.inner.done.subscribe();
        let started = Instant::now();

        tokio::select! {
            biased;
            _ = done.wait_for(|finished| *finished) => Ok(()),
            () = deadline.expired() => {
                let waited = started.elapsed();
                let pending = self.in_flight();
                warn!(
                    closer_id = %self.inner.id,
                    waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                    pending,
                    "Shutdown deadline exceeded, releasers continue in background"
                );
                Err(CloserError::DeadlineExceeded { waited, pending })
            }
        }
    }
}

impl Default for Closer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Closer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closer")
            .field("id", &self.inner.id)
            .field("order", &self.inner.order)
            .field("state", &self.state())
            .field("pending_count", &self.len())
            .finish()
    }
}
