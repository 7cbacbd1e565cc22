//! Parallel dispatch of commands across a worker pool
//!
//! This module handles:
//! - [`run`] - single-command execution on the ambient scheduler
//! - [`parallel`] - fan a command set out across a pool and fan outcomes
//!   back in as a completion-ordered stream
//! - [`OutcomeStream`] - the raw lazy sequence behind a `parallel` call

use futures::Stream;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tracing::debug;

use crate::core::{Command, ExecOptions, ExecutionOutcome, Result};
use crate::runtime::pool::{PoolStrategy, WorkerPool};
use crate::runtime::process;
use crate::runtime::stream::LazyStream;

/// Execute one command without blocking the calling task
///
/// Delegates straight to the ambient async scheduler; no worker pool is
/// constructed for a single command.
///
/// # Examples
///
/// ```rust,no_run
/// use cmdstream::{run, ExecOptions};
///
/// # #[tokio::main]
/// # async fn main() -> cmdstream::Result<()> {
/// let outcome = run("whoami", ExecOptions::new().capture_output(true)).await?;
/// println!("{}", outcome.stdout_text().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`Error::Launch`](crate::Error::Launch) if the program cannot be
/// started and [`Error::Timeout`](crate::Error::Timeout) if a configured
/// timeout elapses. A non-zero exit status is a normal outcome, not an error.
pub async fn run(command: impl Into<Command>, options: ExecOptions) -> Result<ExecutionOutcome> {
    let command = command.into();
    process::execute_command(&command, &options).await
}

/// Run many commands in parallel, streaming outcomes in completion order
///
/// The commands are iterated eagerly, once, at this call; the full set is
/// known up front and nothing can be added mid-run. Execution starts when
/// the returned [`Parallel`] is consumed - as a stream, or awaited for the
/// collected outcomes.
///
/// # Examples
///
/// ```rust,no_run
/// use cmdstream::{parallel, Command, ExecOptions};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> cmdstream::Result<()> {
/// let commands = (0..4).map(|_| Command::new("whoami"));
/// let mut outcomes = parallel(commands)
///     .options(ExecOptions::new().capture_output(true))
///     .stream();
/// while let Some(outcome) = outcomes.next().await {
///     println!("exit status: {}", outcome?.status);
/// }
/// # Ok(())
/// # }
/// ```
pub fn parallel<I, C>(commands: I) -> Parallel
where
    I: IntoIterator<Item = C>,
    C: Into<Command>,
{
    Parallel::new(commands)
}

/// A configured `parallel` invocation
///
/// Fluent configuration before consumption: pick a [`PoolStrategy`], attach
/// [`ExecOptions`], and optionally hang predicate/collector/reduction stages
/// off the result sequence. Consume it with [`stream`](Self::stream) for
/// per-item iteration or `.await` for the collected outcomes.
#[derive(Debug)]
pub struct Parallel {
    commands: Vec<Command>,
    strategy: PoolStrategy,
    options: ExecOptions,
}

impl Parallel {
    fn new<I, C>(commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Command>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            strategy: PoolStrategy::default(),
            options: ExecOptions::default(),
        }
    }

    /// Select the worker pool strategy (defaults to [`PoolStrategy::Process`])
    pub fn strategy(mut self, strategy: PoolStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attach the options applied to every command in this call
    pub fn options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    /// Consume as the raw completion-ordered stream of outcomes
    pub fn stream(self) -> OutcomeStream {
        OutcomeStream::new(self.commands, self.strategy, self.options)
    }

    /// Consume as a [`LazyStream`] ready for predicate/collector stages
    pub fn lazy(self) -> LazyStream<ExecutionOutcome> {
        LazyStream::new(self.stream())
    }

    /// Keep only outcomes the predicate accepts; the rest are silently skipped
    pub fn filter(
        self,
        predicate: impl FnMut(&ExecutionOutcome) -> bool + Send + 'static,
    ) -> LazyStream<ExecutionOutcome> {
        self.lazy().filter(predicate)
    }

    /// Transform each outcome before it reaches the consumer
    pub fn map<U>(
        self,
        collector: impl FnMut(ExecutionOutcome) -> U + Send + 'static,
    ) -> LazyStream<ExecutionOutcome, U> {
        self.lazy().map(collector)
    }

    /// Choose the collection shape produced when awaited as a whole
    pub fn collect_with<C>(
        self,
        iterator: impl FnOnce(Vec<ExecutionOutcome>) -> C + Send + 'static,
    ) -> LazyStream<ExecutionOutcome, ExecutionOutcome, C> {
        self.lazy().collect_with(iterator)
    }

    /// Reduce the fully-collected outcomes to a single aggregate value
    pub fn reduce<R>(
        self,
        result: impl FnOnce(Vec<ExecutionOutcome>) -> R + Send + 'static,
    ) -> LazyStream<ExecutionOutcome, ExecutionOutcome, R> {
        self.lazy().reduce(result)
    }
}

impl IntoFuture for Parallel {
    type Output = Result<Vec<ExecutionOutcome>>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    /// Await the invocation, collecting every outcome
    ///
    /// Collection stops at the first task failure, which becomes the awaited
    /// error.
    fn into_future(self) -> Self::IntoFuture {
        self.lazy().into_future()
    }
}

/// Completion-ordered lazy sequence of command outcomes
///
/// A finite, single-pass stream: each item is yielded as soon as its task
/// resolves, in whatever order the pool finishes work - never submission
/// order. The backing pool is acquired on first poll; a pool acquisition
/// failure is the first and only item. Dropping the stream at any point
/// releases the pool and, per strategy, kills or abandons still-running
/// commands.
pub struct OutcomeStream {
    state: StreamState,
}

enum StreamState {
    Pending {
        commands: Vec<Command>,
        strategy: PoolStrategy,
        options: ExecOptions,
    },
    Running {
        pool: WorkerPool,
    },
    Done,
}

impl OutcomeStream {
    fn new(commands: Vec<Command>, strategy: PoolStrategy, options: ExecOptions) -> Self {
        Self {
            state: StreamState::Pending {
                commands,
                strategy,
                options,
            },
        }
    }
}

impl Stream for OutcomeStream {
    type Item = Result<ExecutionOutcome>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                StreamState::Pending { .. } => {
                    let StreamState::Pending {
                        commands,
                        strategy,
                        options,
                    } = std::mem::replace(&mut this.state, StreamState::Done)
                    else {
                        unreachable!("pending state checked above");
                    };
                    match WorkerPool::new(strategy, options.max_workers) {
                        Ok(mut pool) => {
                            debug!(commands = commands.len(), ?strategy, "dispatching commands");
                            for command in commands {
                                pool.submit(command, options.clone());
                            }
                            this.state = StreamState::Running { pool };
                        }
                        // Acquisition failure surfaces before any outcome.
                        Err(error) => return Poll::Ready(Some(Err(error))),
                    }
                }
                StreamState::Running { pool } => {
                    return match ready!(pool.poll_join_next(cx)) {
                        Some(result) => Poll::Ready(Some(result)),
                        None => {
                            this.state = StreamState::Done;
                            Poll::Ready(None)
                        }
                    };
                }
                StreamState::Done => return Poll::Ready(None),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            StreamState::Pending { commands, .. } => (commands.len(), Some(commands.len())),
            StreamState::Running { pool } => (pool.outstanding(), Some(pool.outstanding())),
            StreamState::Done => (0, Some(0)),
        }
    }
}
