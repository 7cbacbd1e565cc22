//! Bounded worker pools for parallel command execution
//!
//! This module handles:
//! - The two interchangeable execution strategies ([`PoolStrategy`])
//! - Admission control via a semaphore sized to the worker count
//! - Completion-ordered fan-in over a [`tokio::task::JoinSet`]

use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::core::{Command, Error, ExecOptions, ExecutionOutcome, Result};
use crate::runtime::process;

/// Which kind of worker hosts the blocking subprocess wait
///
/// Both strategies expose the identical submission interface and produce the
/// same outcomes; the difference is what happens to still-running commands
/// when the pool is torn down early:
///
/// - [`Process`](Self::Process): every in-flight command is its own operating
///   system process, awaited asynchronously. Teardown kills still-running
///   children.
/// - [`Thread`](Self::Thread): the wait is hosted on the runtime's blocking
///   thread pool. Threads cannot be forcibly killed, so on teardown
///   still-running commands finish in the background and their results are
///   discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolStrategy {
    /// One OS process per in-flight command; teardown kills stragglers
    #[default]
    Process,
    /// Blocking-pool threads host the wait; stragglers finish and are discarded
    Thread,
}

/// A scoped, bounded set of workers executing submitted commands
///
/// The pool is exclusively owned by one `parallel` call for the duration of
/// that call. Submission is unbounded; execution is bounded by the worker
/// count through a semaphore acquired as each task's first await. Dropping
/// the pool aborts all outstanding tasks, which is the scoped release that
/// fires on every exit path.
#[derive(Debug)]
pub struct WorkerPool {
    strategy: PoolStrategy,
    permits: Arc<Semaphore>,
    workers: usize,
    tasks: JoinSet<Result<ExecutionOutcome>>,
}

impl WorkerPool {
    /// Acquire a pool with the given strategy and worker count
    ///
    /// The worker count defaults to the number of available processor cores.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pool`] if the requested worker count is zero.
    pub fn new(strategy: PoolStrategy, max_workers: Option<usize>) -> Result<Self> {
        let workers = max_workers.unwrap_or_else(num_cpus::get);
        if workers == 0 {
            return Err(Error::pool("worker pool requires at least one worker"));
        }
        debug!(?strategy, workers, "acquired worker pool");
        Ok(Self {
            strategy,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            tasks: JoinSet::new(),
        })
    }

    /// The execution strategy this pool was acquired with
    pub fn strategy(&self) -> PoolStrategy {
        self.strategy
    }

    /// The number of workers bounding concurrent execution
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The number of submitted tasks not yet resolved
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Submit one command for execution
    ///
    /// The task is spawned immediately; it runs once a worker permit frees
    /// up. Must be called from within a tokio runtime.
    pub fn submit(&mut self, command: Command, options: ExecOptions) {
        trace!(command = %command, "submitting command to pool");
        let permits = Arc::clone(&self.permits);
        match self.strategy {
            PoolStrategy::Process => {
                self.tasks.spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| Error::pool("worker pool closed"))?;
                    process::execute_command(&command, &options).await
                });
            }
            PoolStrategy::Thread => {
                self.tasks.spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| Error::pool("worker pool closed"))?;
                    tokio::task::spawn_blocking(move || {
                        process::execute_command_blocking(&command, &options)
                    })
                    .await
                    .unwrap_or_else(|e| Err(Error::pool(format!("worker thread failed: {e}"))))
                });
            }
        }
    }

    /// Poll for the next resolved task, in completion order
    ///
    /// A worker panic surfaces as [`Error::Pool`] at that task's position
    /// without affecting sibling tasks.
    pub fn poll_join_next(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<ExecutionOutcome>>> {
        match self.tasks.poll_join_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Ready(Some(Ok(result))) => Poll::Ready(Some(result)),
            Poll::Ready(Some(Err(join_error))) => Poll::Ready(Some(Err(Error::pool(format!(
                "worker task failed: {join_error}"
            ))))),
        }
    }

    /// Await the next resolved task, in completion order
    pub async fn join_next(&mut self) -> Option<Result<ExecutionOutcome>> {
        std::future::poll_fn(|cx| self.poll_join_next(cx)).await
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            debug!(
                outstanding = self.tasks.len(),
                strategy = ?self.strategy,
                "tearing down worker pool with outstanding tasks"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_zero_workers_is_pool_error() {
        let result = WorkerPool::new(PoolStrategy::Process, Some(0));
        assert!(matches!(result, Err(Error::Pool(_))));
    }

    #[test]
    fn test_default_worker_count_is_core_count() {
        let pool = WorkerPool::new(PoolStrategy::Thread, None).unwrap();
        assert_eq!(pool.workers(), num_cpus::get());
    }

    #[tokio::test]
    async fn test_submit_and_join() {
        let mut pool = WorkerPool::new(PoolStrategy::Process, Some(2)).unwrap();
        pool.submit(
            Command::new("echo").arg("one"),
            ExecOptions::new().capture_output(true),
        );
        assert_eq!(pool.outstanding(), 1);

        let outcome = pool.join_next().await.unwrap().unwrap();
        assert_eq!(outcome.stdout_text().unwrap().trim(), "one");
        assert!(pool.join_next().await.is_none());
    }

    #[tokio::test]
    async fn test_workers_bound_execution() {
        // Four 300ms sleeps on two workers cannot finish in one batch.
        let mut pool = WorkerPool::new(PoolStrategy::Thread, Some(2)).unwrap();
        for _ in 0..4 {
            pool.submit(Command::new("sleep").arg("0.3"), ExecOptions::new());
        }

        let started = Instant::now();
        let mut resolved = 0;
        while let Some(result) = pool.join_next().await {
            result.unwrap();
            resolved += 1;
        }
        assert_eq!(resolved, 4);
        assert!(started.elapsed() >= Duration::from_millis(550));
    }

    #[tokio::test]
    async fn test_strategies_share_submission_interface() {
        for strategy in [PoolStrategy::Process, PoolStrategy::Thread] {
            let mut pool = WorkerPool::new(strategy, Some(2)).unwrap();
            pool.submit(
                Command::new("echo").arg("same"),
                ExecOptions::new().capture_output(true),
            );
            let outcome = pool.join_next().await.unwrap().unwrap();
            assert_eq!(outcome.stdout_text().unwrap().trim(), "same");
        }
    }
}
