//! Error types for command execution and pool management

use std::time::Duration;
use thiserror::Error;

/// Comprehensive error type for cmdstream operations
///
/// A non-zero exit status is deliberately NOT represented here: it is an
/// ordinary value on [`ExecutionOutcome`](crate::core::ExecutionOutcome) that
/// the caller inspects. Errors cover the cases where no outcome exists at all.
#[derive(Error, Debug)]
pub enum Error {
    /// The target program could not be started (missing executable,
    /// permission denied, empty program name). Never retried.
    #[error("Failed to launch command: {0}")]
    Launch(String),

    /// A per-command timeout elapsed. The process is killed before this
    /// error is returned, so no orphaned process survives a reported timeout.
    #[error("Command timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The worker pool failed to initialize, or a worker task died
    /// unexpectedly. Initialization failures are fatal to the whole
    /// `parallel` call.
    #[error("Worker pool error: {0}")]
    Pool(String),

    /// I/O failure on an already-launched child (stdin write, stream drain)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a launch error
    pub fn launch<S: Into<String>>(msg: S) -> Self {
        Self::Launch(msg.into())
    }

    /// Create a pool error
    pub fn pool<S: Into<String>>(msg: S) -> Self {
        Self::Pool(msg.into())
    }

    /// Check whether this error is a per-command timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Convenient result type for cmdstream operations
pub type Result<T> = std::result::Result<T, Error>;
