//! The record handed to a reporter for each failed releaser.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::FailureCause;

/// One releaser failure.
#[derive(Debug)]
pub struct ReleaseFailure {
    /// Id of the closer that ran the releaser.
    pub closer_id: Uuid,
    /// Name of the releaser.
    pub releaser: String,
    /// Position of the releaser in registration order.
    pub index: usize,
    /// What went wrong.
    pub cause: FailureCause,
    /// How long the releaser ran before failing.
    pub elapsed: Duration,
    /// When the failure was observed.
    pub occurred_at: DateTime<Utc>,
}

impl ReleaseFailure {
    pub(crate) fn new(
        closer_id: Uuid,
        releaser: impl Into<String>,
        index: usize,
        cause: FailureCause,
        elapsed: Duration,
    ) -> Self {
        Self {
            closer_id,
            releaser: releaser.into(),
            index,
            cause,
            elapsed,
            occurred_at: Utc::now(),
        }
    }

    /// Formats the failure as a single log line prefixed with an RFC 3339 timestamp.
    #[must_use]
    pub fn to_log_line(&self) -> String {
        format!(
            "{} {}",
            self.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self
        )
    }
}

impl std::fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to close {}: {}", self.releaser, self.cause)
    }
}
