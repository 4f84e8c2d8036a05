//! # Closer
//!
//! A shutdown coordinator for long-running services.
//!
//! Register resource releasers (connection pools, file handles, background
//! workers) as they are acquired; on termination, run them all exactly once:
//!
//! - **Exactly once**: any number of concurrent `close` calls run the
//!   releasers a single time
//! - **Bounded wait**: callers pass a deadline and get
//!   [`CloserError::DeadlineExceeded`] instead of blocking past it, while
//!   releasers finish in the background
//! - **Configurable order**: parallel fan-out (default), FIFO or LIFO
//! - **Failure isolation**: every failed or panicking releaser is handed to a
//!   pluggable [`FailureReporter`]; siblings always run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use closer::prelude::*;
//! use std::time::Duration;
//!
//! let closer = Closer::builder()
//!     .with_order(ExecutionOrder::Lifo)
//!     .with_deadline(Duration::from_secs(5))
//!     .build();
//!
//! closer.add(move || pool.close());
//! closer.register(Releaser::from_async("worker", || async move {
//!     worker.shutdown().await
//! }));
//!
//! // On SIGTERM
//! closer.close().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod closer;
pub mod config;
pub mod deadline;
pub mod errors;
pub mod global;
pub mod observability;
pub mod reporter;

pub use crate::closer::{CloseState, Closer, CloserBuilder, ReleaseSummary, Releaser};
pub use crate::config::{CloserConfig, ExecutionOrder};
pub use crate::deadline::{Deadline, ShutdownSignal};
pub use crate::errors::{CloserError, FailureCause, ReleaseResult};
pub use crate::reporter::{FailureReporter, ReleaseFailure};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::closer::{CloseState, Closer, CloserBuilder, ReleaseSummary, Releaser};
    pub use crate::config::{CloserConfig, ExecutionOrder};
    pub use crate::deadline::{Deadline, ShutdownSignal};
    pub use crate::errors::{CloserError, FailureCause, ReleaseResult};
    pub use crate::reporter::{
        CollectingReporter, FailureReporter, NoOpReporter, ReleaseFailure, StderrReporter,
        TracingReporter, WriterReporter,
    };
}
