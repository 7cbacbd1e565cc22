//! # cmdstream
//!
//! Async subprocess execution for Rust: run external commands in parallel
//! across a bounded worker pool and stream results back **in completion
//! order** - the first command to finish is the first one you see, whatever
//! order you submitted in.
//!
//! The calling task never blocks. Blocking subprocess waits are hosted on
//! pool workers (one OS process per command, or blocking-pool threads), and
//! every wait on the calling side is a cooperative suspension point.
//!
//! ## Quick start
//!
//! Run a single command:
//!
//! ```rust,no_run
//! use cmdstream::{run, ExecOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> cmdstream::Result<()> {
//! let outcome = run("whoami", ExecOptions::new().capture_output(true)).await?;
//! println!("{}: {}", outcome.status, outcome.stdout_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! Fan a set of commands out and consume outcomes as they complete:
//!
//! ```rust,no_run
//! use cmdstream::{parallel, Command, ExecOptions};
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() -> cmdstream::Result<()> {
//! let commands = (0..16).map(|i| Command::new("git").arg("fetch").arg(format!("remote-{i}")));
//! let mut outcomes = parallel(commands)
//!     .options(ExecOptions::new().capture_output(true).max_workers(4))
//!     .stream();
//!
//! while let Some(outcome) = outcomes.next().await {
//!     println!("finished with status {}", outcome?.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Or await the whole call with filtering and reduction applied lazily:
//!
//! ```rust,no_run
//! use cmdstream::{parallel, Command, ExecOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> cmdstream::Result<()> {
//! let failures = parallel(["./check-a", "./check-b", "./check-c"].map(Command::new))
//!     .options(ExecOptions::new().capture_output(true))
//!     .filter(|outcome| !outcome.success())
//!     .reduce(|outcomes| outcomes.len())
//!     .await?;
//! assert_eq!(failures, 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pool strategies
//!
//! [`PoolStrategy::Process`] (the default) gives every in-flight command its
//! own OS process and kills stragglers when a run is abandoned.
//! [`PoolStrategy::Thread`] hosts the blocking waits on the runtime's thread
//! pool; abandoned commands finish in the background and are discarded, since
//! threads cannot be forcibly killed. Both produce identical outcomes for a
//! completed run.
//!
//! ## Errors
//!
//! A non-zero exit status is **not** an error - it is ordinary data on
//! [`ExecutionOutcome`]. [`Error::Launch`] and [`Error::Timeout`] are local
//! to one command and appear in the sequence where that command's outcome
//! would have been; [`Error::Pool`] aborts a whole `parallel` call before any
//! outcome is yielded.

pub mod core;
pub mod runtime;

// Re-export the public surface at the crate root
pub use crate::core::{Command, Error, ExecOptions, ExecutionOutcome, Result};
pub use crate::runtime::{parallel, run, LazyStream, OutcomeStream, Parallel, PoolStrategy, WorkerPool};
