//! The process-wide closer. Kept in its own test binary so no other test
//! touches the shared instance.

use closer::global::{self, Applied, Reconfigure};
use closer::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn global_closer_lifecycle() {
    let _ = closer::observability::init_logging(closer::observability::LogFormat::Pretty);

    // First reconfiguration wins
    let first = Arc::new(CollectingReporter::new());
    let second = Arc::new(CollectingReporter::new());
    assert!(global::replace_reporter(first.clone()));
    assert!(!global::replace_reporter(second.clone()));

    let applied = global::reconfigure(
        Reconfigure::new()
            .with_reporter(second.clone())
            .with_deadline(Duration::from_secs(5)),
    );
    assert_eq!(
        applied,
        Applied {
            reporter: false,
            deadline: true,
        }
    );
    assert!(!global::replace_deadline(Duration::from_millis(1)));

    for _ in 0..3 {
        global::add(|| Err(anyhow::anyhow!("connection closed")));
    }
    global::register(Releaser::new("cache", || Ok(())));
    assert_eq!(global::pending(), 4);
    assert_eq!(global::state(), CloseState::Open);

    assert_ok!(global::close().await);
    assert_ok!(global::close().await);
    assert_ok!(global::close_with(Duration::ZERO).await);

    assert_eq!(global::state(), CloseState::Closed);
    assert_eq!(first.len(), 3);
    assert!(second.is_empty());
    assert_eq!(global::global().summary().map(|s| s.failed), Some(3));

    // Shutdown already happened
    let err = global::try_register(Releaser::new("late", || Ok(()))).unwrap_err();
    assert!(matches!(err, CloserError::Closing(_)));
    assert!(!global::replace_reporter(second));
}
