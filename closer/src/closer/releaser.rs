//! Releaser callbacks.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

use crate::errors::{FailureCause, ReleaseResult};

enum Action {
    Blocking(Box<dyn FnOnce() -> ReleaseResult + Send>),
    Async(Box<dyn FnOnce() -> BoxFuture<'static, ReleaseResult> + Send>),
}

/// A zero-argument fallible callback releasing one resource.
///
/// Blocking releasers run on tokio's blocking pool; async releasers run as
/// ordinary tasks. Either kind runs at most once. Callbacks only need to be
/// `Send`: each one is moved out of the registry and called by value.
pub struct Releaser {
    name: Option<String>,
    action: Action,
}

impl Releaser {
    /// Creates a named blocking releaser.
    pub fn new<F>(name: impl Into<String>, release: F) -> Self
    where
        F: FnOnce() -> ReleaseResult + Send + 'static,
    {
        Self {
            name: Some(name.into()),
            action: Action::Blocking(Box::new(release)),
        }
    }

    /// Creates a named async releaser.
    pub fn from_async<F, Fut>(name: impl Into<String>, release: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ReleaseResult> + Send + 'static,
    {
        Self {
            name: Some(name.into()),
            action: Action::Async(Box::new(move || release().boxed())),
        }
    }

    /// Creates an unnamed blocking releaser.
    pub fn unnamed<F>(release: F) -> Self
    where
        F: FnOnce() -> ReleaseResult + Send + 'static,
    {
        Self {
            name: None,
            action: Action::Blocking(Box::new(release)),
        }
    }

    /// Returns the releaser's name, if it was given one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns true if the releaser runs on the blocking pool.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self.action, Action::Blocking(_))
    }

    pub(crate) fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("releaser#{index}"))
    }

    /// Runs the releaser, turning a panic into a failure cause.
    pub(crate) async fn run(self) -> Result<(), FailureCause> {
        let outcome = match self.action {
            Action::Blocking(release) => {
                match tokio::task::spawn_blocking(move || {
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(release))
                })
                .await
                {
                    Ok(outcome) => outcome,
                    Err(join_err) => {
                        return Err(FailureCause::Panicked(format!(
                            "blocking task join error: {join_err}"
                        )))
                    }
                }
            }
            Action::Async(release) => std::panic::AssertUnwindSafe(release())
                .catch_unwind()
                .await,
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(FailureCause::Error(e)),
            Err(panic) => Err(FailureCause::from_panic(panic.as_ref())),
        }
    }
}

impl std::fmt::Debug for Releaser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Releaser")
            .field("name", &self.name)
            .field("blocking", &self.is_blocking())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_blocking_releaser_runs() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        let releaser = Releaser::new("file", move || {
            ran_clone.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert!(releaser.is_blocking());
        assert!(releaser.run().await.is_ok());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_releaser_may_capture_unsync_state() {
        let attempts = std::cell::Cell::new(0_u32);
        let releaser = Releaser::new("retrying", move || {
            attempts.set(attempts.get() + 1);
            anyhow::ensure!(attempts.get() == 1, "ran twice");
            Ok(())
        });

        assert!(releaser.run().await.is_ok());
    }

    async fn connection_closed() -> ReleaseResult {
        Err(anyhow::anyhow!("connection closed"))
    }

    async fn panicking() -> ReleaseResult {
        panic!("Intentional")
    }

    #[tokio::test]
    async fn test_async_releaser_error() {
        let releaser = Releaser::from_async("conn", connection_closed);

        assert!(!releaser.is_blocking());
        let cause = releaser.run().await.unwrap_err();
        assert_eq!(cause.to_string(), "connection closed");
    }

    #[tokio::test]
    async fn test_blocking_panic_is_caught() {
        let releaser = Releaser::new("bad", || panic!("Intentional"));
        let cause = releaser.run().await.unwrap_err();
        assert!(cause.is_panic());
        assert_eq!(cause.to_string(), "releaser panicked: Intentional");
    }

    #[tokio::test]
    async fn test_async_panic_is_caught() {
        let releaser = Releaser::from_async("bad", panicking);
        let cause = releaser.run().await.unwrap_err();
        assert!(cause.is_panic());
    }

    fn noop() -> ReleaseResult {
        Ok(())
    }

    #[test]
    fn test_label_falls_back_to_index() {
        let named = Releaser::new("db", noop);
        let unnamed = Releaser::unnamed(noop);

        assert_eq!(named.label(4), "db");
        assert_eq!(unnamed.name(), None);
        assert_eq!(unnamed.label(4), "releaser#4");
    }
}
