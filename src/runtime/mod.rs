//! Runtime engine for parallel command execution
//!
//! This module handles:
//! - Spawning and waiting on child processes ([`process`])
//! - Bounded worker pools with two execution strategies ([`pool`])
//! - Fan-out/fan-in dispatch with completion-order streaming ([`dispatch`])
//! - Lazy filtering, transformation, and reduction of result sequences ([`stream`])

pub mod dispatch;
pub mod pool;
pub mod process;
pub mod stream;


// Re-export commonly used types
pub use dispatch::{parallel, run, OutcomeStream, Parallel};
pub use pool::{PoolStrategy, WorkerPool};
pub use stream::LazyStream;
