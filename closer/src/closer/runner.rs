//! Executes a snapshot of releasers according to the execution order.

use futures::future::join_all;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{Inner, Releaser, ReleaseSummary};
use crate::config::ExecutionOrder;
use crate::reporter::{report_safely, FailureReporter, ReleaseFailure};

/// Marks the closer closed when dropped.
///
/// Owned by the driver future, so the closer reaches `Closed` even if that
/// future is dropped unfinished, as happens when its runtime shuts down.
/// Releasers that never finished are counted as failed.
pub(super) struct Completion {
    inner: Arc<Inner>,
    total: usize,
    started: Instant,
}

impl Completion {
    pub(super) fn new(inner: Arc<Inner>, total: usize) -> Self {
        Self {
            inner,
            total,
            started: Instant::now(),
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        let abandoned = self.inner.in_flight.swap(0, Ordering::SeqCst);
        if abandoned > 0 {
            warn!(
                closer_id = %self.inner.id,
                abandoned,
                "Runtime shut down before releasers finished"
            );
        }
        self.inner.finish(ReleaseSummary {
            total: self.total,
            failed: self.inner.failed.load(Ordering::SeqCst) + abandoned,
            elapsed: self.started.elapsed(),
        });
    }
}

/// Runs every releaser in the snapshot, then marks the closer closed.
///
/// Runs detached from any caller so a caller giving up on its deadline never
/// cancels releasers.
pub(super) async fn drive(
    completion: Completion,
    releasers: Vec<Releaser>,
    reporter: Arc<dyn FailureReporter>,
) {
    let inner = completion.inner.clone();

    match inner.order {
        ExecutionOrder::Parallel => {
            let handles: Vec<_> = releasers
                .into_iter()
                .enumerate()
                .map(|(index, releaser)| {
                    tokio::spawn(release_one(
                        inner.clone(),
                        index,
                        releaser,
                        reporter.clone(),
                    ))
                })
                .collect();

            // A cancelled task never decrements `in_flight`; `Completion` counts it
            join_all(handles).await;
        }
        ExecutionOrder::Fifo => {
            sequential(&inner, releasers.into_iter().enumerate(), &reporter).await;
        }
        ExecutionOrder::Lifo => {
            sequential(&inner, releasers.into_iter().enumerate().rev(), &reporter).await;
        }
    }

    drop(completion);
}

async fn sequential(
    inner: &Arc<Inner>,
    releasers: impl Iterator<Item = (usize, Releaser)> + Send,
    reporter: &Arc<dyn FailureReporter>,
) {
    for (index, releaser) in releasers {
        release_one(inner.clone(), index, releaser, reporter.clone()).await;
    }
}

/// Runs one releaser and reports its failure.
async fn release_one(
    inner: Arc<Inner>,
    index: usize,
    releaser: Releaser,
    reporter: Arc<dyn FailureReporter>,
) {
    let label = releaser.label(index);
    let started = Instant::now();

    match releaser.run().await {
        Ok(()) => {
            debug!(closer_id = %inner.id, releaser = %label, "Released");
        }
        Err(cause) => {
            let failure = ReleaseFailure::new(inner.id, label, index, cause, started.elapsed());
            report_safely(reporter.as_ref(), &failure);
            inner.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    // Saturating: `Completion` may already have zeroed the count
    let _ = inner
        .in_flight
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
}
