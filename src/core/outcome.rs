//! The result of one completed command execution

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::process::{ExitStatus, Output};

/// Result of running one [`Command`](crate::core::Command) to completion
///
/// Carries the real exit status of the process and, when capture was
/// requested, the fully-drained output streams. A non-zero status is ordinary
/// data here, never an error. Once yielded, the outcome is owned solely by
/// the consumer; the engine keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Process exit code; `-1` when the process was terminated by a signal
    /// and no code exists
    pub status: i32,
    /// Captured standard output, present only when capture was requested
    pub stdout: Option<Bytes>,
    /// Captured standard error, present only when capture was requested
    pub stderr: Option<Bytes>,
}

impl ExecutionOutcome {
    pub(crate) fn from_status(status: ExitStatus) -> Self {
        Self {
            status: exit_code(status),
            stdout: None,
            stderr: None,
        }
    }

    pub(crate) fn from_output(output: Output) -> Self {
        Self {
            status: exit_code(output.status),
            stdout: Some(Bytes::from(output.stdout)),
            stderr: Some(Bytes::from(output.stderr)),
        }
    }

    pub(crate) fn from_parts(status: ExitStatus, stdout: Option<Bytes>, stderr: Option<Bytes>) -> Self {
        Self {
            status: exit_code(status),
            stdout,
            stderr,
        }
    }

    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Captured standard output as text (lossy UTF-8), if capture was requested
    pub fn stdout_text(&self) -> Option<String> {
        self.stdout
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Captured standard error as text (lossy UTF-8), if capture was requested
    pub fn stderr_text(&self) -> Option<String> {
        self.stderr
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    // Signal termination carries no exit code.
    status.code().unwrap_or(-1)
}
