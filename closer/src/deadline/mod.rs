//! Deadlines bounding how long a shutdown caller waits.
//!
//! A deadline is advisory to the waiting caller only. Releasers are never
//! interrupted when it fires.

mod signal;

pub use signal::ShutdownSignal;

use std::time::Duration;
use tokio::time::Instant;

/// How long a caller of [`Closer::close`](crate::Closer::close) waits.
#[derive(Debug, Clone, Default)]
pub enum Deadline {
    /// Wait until every releaser has finished.
    #[default]
    Never,
    /// Wait at most this long, measured from the start of the wait.
    After(Duration),
    /// Wait until this point in time.
    At(Instant),
    /// Wait until the signal fires.
    Signal(ShutdownSignal),
}

impl Deadline {
    /// Returns true if this deadline never fires.
    #[must_use]
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Resolves once the deadline has passed. Never resolves for [`Deadline::Never`].
    pub(crate) async fn expired(&self) {
        match self {
            Self::Never => std::future::pending::<()>().await,
            Self::After(timeout) => tokio::time::sleep(*timeout).await,
            Self::At(instant) => tokio::time::sleep_until(*instant).await,
            Self::Signal(signal) => signal.cancelled().await,
        }
    }
}

impl From<Duration> for Deadline {
    fn from(timeout: Duration) -> Self {
        Self::After(timeout)
    }
}

impl From<Instant> for Deadline {
    fn from(instant: Instant) -> Self {
        Self::At(instant)
    }
}

impl From<ShutdownSignal> for Deadline {
    fn from(signal: ShutdownSignal) -> Self {
        Self::Signal(signal)
    }
}

impl From<Option<Duration>> for Deadline {
    fn from(timeout: Option<Duration>) -> Self {
        timeout.map_or(Self::Never, Self::After)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_after_expires_on_time() {
        let start = Instant::now();
        Deadline::After(Duration::from_millis(50)).expired().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(50) && elapsed < Duration::from_millis(52));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_in_past_expires_immediately() {
        let start = Instant::now();
        Deadline::At(start).expired().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_does_not_expire() {
        let result =
            tokio::time::timeout(Duration::from_secs(3600), Deadline::Never.expired()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_signal_expires_when_fired() {
        let signal = ShutdownSignal::new();
        signal.cancel("done");
        Deadline::from(signal).expired().await;
    }

    #[test]
    fn test_conversions() {
        assert!(Deadline::from(None::<Duration>).is_never());
        assert!(matches!(
            Deadline::from(Some(Duration::from_secs(1))),
            Deadline::After(d) if d == Duration::from_secs(1)
        ));
        assert!(Deadline::default().is_never());
    }
}
