//! Error types for the closer crate.
//!
//! Releaser failures never show up here: they are routed to the
//! [`FailureReporter`](crate::reporter::FailureReporter). A caller of
//! [`Closer::close`](crate::Closer::close) only learns whether shutdown
//! finished in time.

use std::time::Duration;
use thiserror::Error;

/// Result type returned by every releaser.
///
/// Any error implementing `std::error::Error + Send + Sync` converts into it
/// with `?`.
pub type ReleaseResult = anyhow::Result<()>;

/// The main error type for closer operations.
#[derive(Debug, Error)]
pub enum CloserError {
    /// The caller's deadline fired before every releaser finished.
    ///
    /// Releasers keep running in the background.
    #[error("shutdown deadline exceeded after {waited:?} with {pending} releaser(s) still running")]
    DeadlineExceeded {
        /// How long the caller waited.
        waited: Duration,
        /// Releasers still in flight when the deadline fired.
        pending: usize,
    },

    /// A registration arrived after shutdown had started.
    #[error("shutdown already started, releaser `{0}` was not registered")]
    Closing(String),

    /// Shutdown was requested outside of a tokio runtime.
    #[error("no tokio runtime available to run releasers")]
    NoRuntime,

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The logging subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),
}

impl CloserError {
    /// Returns true if this is a deadline expiry.
    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

impl From<serde_json::Error> for CloserError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Extracts the message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string panic payload>".to_string())
}

/// Why a single releaser failed.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The releaser returned an error.
    #[error("{0:#}")]
    Error(anyhow::Error),

    /// The releaser panicked.
    #[error("releaser panicked: {0}")]
    Panicked(String),
}

impl FailureCause {
    /// Builds a cause from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        Self::Panicked(panic_message(payload))
    }

    /// Returns true if the releaser panicked.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}
