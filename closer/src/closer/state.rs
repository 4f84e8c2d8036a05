//! Close state and shutdown summary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a closer. Transitions are one-way: open, closing, closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CloseState {
    /// Accepting registrations.
    Open = 0,
    /// Shutdown started; releasers may still be running.
    Closing = 1,
    /// Every releaser has finished.
    Closed = 2,
}

impl CloseState {
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Open,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

impl std::fmt::Display for CloseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Outcome of a completed shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    /// Releasers that ran.
    pub total: usize,
    /// Releasers that returned an error or panicked.
    pub failed: usize,
    /// Wall-clock time from shutdown start to the last releaser finishing.
    pub elapsed: Duration,
}

impl ReleaseSummary {
    /// Number of releasers that finished cleanly.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    /// Returns true if no releaser failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Converts to a JSON value for structured logging.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total,
            "failed": self.failed,
            "succeeded": self.succeeded(),
            "elapsed_ms": u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_u8() {
        assert_eq!(CloseState::from_u8(CloseState::Open as u8), CloseState::Open);
        assert_eq!(CloseState::from_u8(CloseState::Closing as u8), CloseState::Closing);
        assert_eq!(CloseState::from_u8(CloseState::Closed as u8), CloseState::Closed);
        assert_eq!(CloseState::Closing.to_string(), "closing");
    }

    #[test]
    fn test_summary_counts() {
        let summary = ReleaseSummary {
            total: 5,
            failed: 2,
            elapsed: Duration::from_millis(12),
        };
        assert_eq!(summary.succeeded(), 3);
        assert!(!summary.is_clean());
        assert!(ReleaseSummary::default().is_clean());
    }

    #[test]
    fn test_summary_to_json() {
        let summary = ReleaseSummary {
            total: 3,
            failed: 1,
            elapsed: Duration::from_millis(40),
        };
        assert_eq!(
            summary.to_json(),
            serde_json::json!({"total": 3, "failed": 1, "succeeded": 2, "elapsed_ms": 40})
        );
    }
}
