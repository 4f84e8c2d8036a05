//! Failure reporting for releasers.
//!
//! A [`FailureReporter`] receives one [`ReleaseFailure`] per failed releaser.
//! Reporters are called concurrently from releaser tasks and must serialize
//! access to their sink themselves.

mod failure;
mod sinks;

pub use failure::ReleaseFailure;
pub use sinks::{CollectingReporter, NoOpReporter, StderrReporter, TracingReporter, WriterReporter};

use tracing::warn;

use crate::errors::panic_message;

/// Capability invoked for every releaser that fails.
///
/// Implementations should return promptly and must not rely on being called
/// in registration order.
#[cfg_attr(test, mockall::automock)]
pub trait FailureReporter: Send + Sync {
    /// Reports a single failure.
    fn report(&self, failure: &ReleaseFailure);
}

impl<F> FailureReporter for F
where
    F: Fn(&ReleaseFailure) + Send + Sync,
{
    fn report(&self, failure: &ReleaseFailure) {
        self(failure);
    }
}

/// Hands a failure to a reporter, swallowing any panic it raises.
///
/// Returns the panic message if the reporter panicked.
pub(crate) fn report_safely(
    reporter: &dyn FailureReporter,
    failure: &ReleaseFailure,
) -> Option<String> {
    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        reporter.report(failure);
    }))
    .err()?;
    let message = panic_message(payload.as_ref());
    warn!(
        releaser = %failure.releaser,
        "Failure reporter panicked: {}", message
    );
    Some(message)
}
