//! Logging setup for binaries embedding the closer.

use tracing_subscriber::EnvFilter;

use crate::errors::CloserError;

/// Output format for [`init_logging`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Installs a global `tracing` subscriber.
///
/// The filter is read from `RUST_LOG`, defaulting to `info`. Fails if a
/// global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<(), CloserError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| CloserError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test may already have installed a subscriber
        let _ = init_logging(LogFormat::Json);
        let err = init_logging(LogFormat::Pretty).unwrap_err();
        assert!(matches!(err, CloserError::Logging(_)));
    }
}
