//! Built-in failure reporters.

use parking_lot::Mutex;
use std::io::{self, Write};
use tracing::{error, trace};

use super::{FailureReporter, ReleaseFailure};

/// A reporter that writes one line per failure to any [`Write`] sink.
///
/// Writes are serialized by an internal lock so concurrent reports never
/// interleave. I/O errors are swallowed.
pub struct WriterReporter<W: Write + Send> {
    sink: Mutex<W>,
}

impl<W: Write + Send> WriterReporter<W> {
    /// Creates a reporter writing to `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Consumes the reporter and returns the sink.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> FailureReporter for WriterReporter<W> {
    fn report(&self, failure: &ReleaseFailure) {
        let line = failure.to_log_line();
        let mut sink = self.sink.lock();
        if let Err(e) = writeln!(sink, "{line}").and_then(|()| sink.flush()) {
            trace!("Dropping failure report, sink unavailable: {}", e);
        }
    }
}

impl<W: Write + Send> std::fmt::Debug for WriterReporter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterReporter").finish_non_exhaustive()
    }
}

/// The default reporter: one line per failure on standard error.
#[derive(Debug)]
pub struct StderrReporter {
    inner: WriterReporter<io::Stderr>,
}

impl StderrReporter {
    /// Creates a reporter writing to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: WriterReporter::new(io::stderr()),
        }
    }
}

impl Default for StderrReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureReporter for StderrReporter {
    fn report(&self, failure: &ReleaseFailure) {
        self.inner.report(failure);
    }
}

/// A reporter that emits failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failure: &ReleaseFailure) {
        error!(
            closer_id = %failure.closer_id,
            releaser = %failure.releaser,
            index = failure.index,
            elapsed_ms = u64::try_from(failure.elapsed.as_millis()).unwrap_or(u64::MAX),
            panicked = failure.cause.is_panic(),
            "failed to close: {}", failure.cause
        );
    }
}

/// A reporter that discards all failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl FailureReporter for NoOpReporter {
    fn report(&self, _failure: &ReleaseFailure) {
        // Intentionally empty - discards all failures
    }
}

/// A collecting reporter for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: Mutex<Vec<(String, String)>>,
}

impl CollectingReporter {
    /// Creates a new collecting reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reported `(releaser, message)` pairs in arrival order.
    #[must_use]
    pub fn failures(&self) -> Vec<(String, String)> {
        self.failures.lock().clone()
    }

    /// Returns the rendered failure lines in arrival order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.failures.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Returns the number of collected failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Returns true if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Clears all collected failures.
    pub fn clear(&self) {
        self.failures.lock().clear();
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, failure: &ReleaseFailure) {
        self.failures
            .lock()
            .push((failure.releaser.clone(), failure.to_string()));
    }
}
