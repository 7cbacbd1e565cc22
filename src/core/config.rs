//! Execution options shared by `run` and `parallel`

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Options applied to every command in a call
///
/// All fields default to "leave the process alone": no capture, inherited
/// working directory and environment, nothing written to stdin, no timeout,
/// and a pool sized to the number of processor cores.
///
/// # Examples
///
/// ```rust
/// use cmdstream::ExecOptions;
/// use std::time::Duration;
///
/// let options = ExecOptions::new()
///     .capture_output(true)
///     .env("LC_ALL", "C")
///     .timeout(Duration::from_secs(30));
/// assert!(options.capture_output);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecOptions {
    /// Capture stdout and stderr instead of inheriting them
    pub capture_output: bool,
    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,
    /// Environment variables layered over the inherited environment
    pub env: HashMap<String, String>,
    /// Bytes fed to the child's standard input
    pub input: Option<Bytes>,
    /// Per-command deadline; the process is killed when it elapses
    pub timeout: Option<Duration>,
    /// Worker pool size override for `parallel` calls
    pub max_workers: Option<usize>,
}

impl ExecOptions {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture stdout and stderr on the outcome
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Set the working directory for the child process
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set a single environment variable for the child process
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables for the child process
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Feed the given bytes to the child's standard input
    pub fn input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Set the per-command timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the per-command timeout in whole seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Override the worker pool size for `parallel` calls
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExecOptions::new();
        assert!(!options.capture_output);
        assert!(options.working_dir.is_none());
        assert!(options.env.is_empty());
        assert!(options.input.is_none());
        assert!(options.timeout.is_none());
        assert!(options.max_workers.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = ExecOptions::new()
            .capture_output(true)
            .working_dir("/tmp")
            .env("A", "1")
            .envs([("B", "2"), ("C", "3")])
            .input("stdin data")
            .timeout_secs(5)
            .max_workers(2);

        assert!(options.capture_output);
        assert_eq!(options.working_dir.as_deref(), Some("/tmp".as_ref()));
        assert_eq!(options.env.len(), 3);
        assert_eq!(options.env.get("B").map(String::as_str), Some("2"));
        assert_eq!(options.input.as_deref(), Some(b"stdin data".as_ref()));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_workers, Some(2));
    }

    #[test]
    fn test_options_serde_round() {
        let options = ExecOptions::new().capture_output(true).timeout_secs(1);
        let json = serde_json::to_string(&options).unwrap();
        let back: ExecOptions = serde_json::from_str(&json).unwrap();
        assert!(back.capture_output);
        assert_eq!(back.timeout, Some(Duration::from_secs(1)));
    }
}
