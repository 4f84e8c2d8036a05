//! Serializable closer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::deadline::Deadline;
use crate::errors::CloserError;

/// How registered releasers are executed during shutdown.
///
/// Releasers are always stored in registration order; the order only decides
/// traversal and concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOrder {
    /// All releasers run concurrently, one task each.
    #[default]
    Parallel,
    /// One at a time, first registered first.
    Fifo,
    /// One at a time, last registered first.
    Lifo,
}

impl ExecutionOrder {
    /// Returns true if releasers run one at a time.
    #[must_use]
    pub fn is_sequential(self) -> bool {
        !matches!(self, Self::Parallel)
    }
}

impl std::fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parallel => write!(f, "parallel"),
            Self::Fifo => write!(f, "fifo"),
            Self::Lifo => write!(f, "lifo"),
        }
    }
}

/// Declarative closer settings, loadable from JSON.
///
/// ```json
/// { "order": "lifo", "deadline_ms": 5000 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloserConfig {
    /// Execution order for releasers.
    pub order: ExecutionOrder,
    /// Default deadline for `close()`, in milliseconds. `None` waits forever.
    pub deadline_ms: Option<u64>,
}

impl CloserConfig {
    /// Creates a configuration with defaults (parallel, no deadline).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CloserError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the execution order.
    #[must_use]
    pub fn with_order(mut self, order: ExecutionOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the default deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Returns the configured default deadline.
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        self.deadline_ms.map(Duration::from_millis).into()
    }
}
