//! Process-wide closer.
//!
//! Free functions delegating to one lazily created [`Closer`] with default
//! settings. Prefer passing an explicit `Closer` from your composition root;
//! use this only where ambient access is needed.
//!
//! Reconfiguration is first-wins per setting: the first successful
//! [`replace_reporter`] fixes the reporter, the first successful
//! [`replace_deadline`] fixes the default deadline, and later attempts are
//! ignored. Neither applies once shutdown has started.

use std::sync::{Arc, OnceLock};

use crate::closer::{CloseState, Closer, Releaser};
use crate::deadline::Deadline;
use crate::errors::{CloserError, ReleaseResult};
use crate::reporter::FailureReporter;

static GLOBAL: OnceLock<Closer> = OnceLock::new();

/// Returns the process-wide closer, creating it on first use.
pub fn global() -> &'static Closer {
    GLOBAL.get_or_init(Closer::new)
}

/// Registers a blocking release function with the global closer.
pub fn add<F>(release: F)
where
    F: FnOnce() -> ReleaseResult + Send + 'static,
{
    global().add(release);
}

/// Registers a releaser with the global closer.
pub fn register(releaser: Releaser) {
    global().register(releaser);
}

/// Registers a releaser with the global closer, failing once shutdown started.
pub fn try_register(releaser: Releaser) -> Result<(), CloserError> {
    global().try_register(releaser)
}

/// Shuts the global closer down using its default deadline.
pub async fn close() -> Result<(), CloserError> {
    global().close().await
}

/// Shuts the global closer down, waiting at most `deadline`.
pub async fn close_with(deadline: impl Into<Deadline>) -> Result<(), CloserError> {
    global().close_with(deadline).await
}

/// Replaces the global reporter. First replacement wins.
pub fn replace_reporter(reporter: Arc<dyn FailureReporter>) -> bool {
    global().replace_reporter(reporter)
}

/// Replaces the global default deadline. First replacement wins.
pub fn replace_deadline(deadline: impl Into<Deadline>) -> bool {
    global().replace_deadline(deadline)
}

/// Settings for [`reconfigure`].
#[derive(Default)]
pub struct Reconfigure {
    reporter: Option<Arc<dyn FailureReporter>>,
    deadline: Option<Deadline>,
}

impl Reconfigure {
    /// Creates an empty reconfiguration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reporter to install.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Sets the default deadline to install.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<Deadline>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }
}

/// Which settings a [`reconfigure`] call actually applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    /// The reporter was replaced.
    pub reporter: bool,
    /// The default deadline was replaced.
    pub deadline: bool,
}

/// Applies several settings to the global closer at once.
pub fn reconfigure(settings: Reconfigure) -> Applied {
    let closer = global();
    Applied {
        reporter: settings
            .reporter
            .is_some_and(|reporter| closer.replace_reporter(reporter)),
        deadline: settings
            .deadline
            .is_some_and(|deadline| closer.replace_deadline(deadline)),
    }
}

/// Returns the global closer's state.
pub fn state() -> CloseState {
    global().state()
}

/// Returns the number of releasers registered with the global closer.
pub fn pending() -> usize {
    global().len()
}
