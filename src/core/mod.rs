//! Core types for command execution
//!
//! This module provides:
//! - [`Command`] - the tokens of one external command
//! - [`ExecOptions`] - the options bag applied to every command in a call
//! - [`ExecutionOutcome`] - exit status and captured streams of a finished command
//! - [`Error`] / [`Result`] - the error taxonomy shared across the crate

pub mod command;
pub mod config;
pub mod error;
pub mod outcome;

// Re-export commonly used types
pub use command::Command;
pub use config::ExecOptions;
pub use error::{Error, Result};
pub use outcome::ExecutionOutcome;
