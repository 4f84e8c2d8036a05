//! Builder for [`Closer`].

use std::sync::Arc;

use super::{Closer, Releaser};
use crate::config::{CloserConfig, ExecutionOrder};
use crate::deadline::Deadline;
use crate::reporter::{FailureReporter, StderrReporter};

/// Builder for a [`Closer`].
///
/// Defaults: parallel execution, no deadline, failures written to standard
/// error.
#[derive(Default)]
pub struct CloserBuilder {
    releasers: Vec<Releaser>,
    reporter: Option<Arc<dyn FailureReporter>>,
    deadline: Deadline,
    order: ExecutionOrder,
}

impl CloserBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a releaser registered at construction time.
    #[must_use]
    pub fn with_releaser(mut self, releaser: Releaser) -> Self {
        self.releasers.push(releaser);
        self
    }

    /// Sets the failure reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Sets the default deadline used by `close()`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<Deadline>) -> Self {
        self.deadline = deadline.into();
        self
    }

    /// Sets the execution order.
    #[must_use]
    pub fn with_order(mut self, order: ExecutionOrder) -> Self {
        self.order = order;
        self
    }

    /// Applies declarative configuration (order and default deadline).
    #[must_use]
    pub fn with_config(self, config: &CloserConfig) -> Self {
        self.with_order(config.order).with_deadline(config.deadline())
    }

    /// Builds the closer.
    #[must_use]
    pub fn build(self) -> Closer {
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(StderrReporter::new()));
        Closer::from_parts(self.order, self.releasers, reporter, self.deadline)
    }
}

impl std::fmt::Debug for CloserBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloserBuilder")
            .field("releasers", &self.releasers)
            .field("has_reporter", &self.reporter.is_some())
            .field("deadline", &self.deadline)
            .field("order", &self.order)
            .finish()
    }
}
