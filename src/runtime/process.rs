//! Subprocess runners
//!
//! Two runners with identical observable behavior, one per pool strategy:
//! an async path on `tokio::process` for process-strategy workers, and a
//! blocking path on `std::process` for workers hosted on the blocking thread
//! pool. Both return the real exit status, drain captured streams fully, and
//! guarantee that a reported timeout killed the process first.

use bytes::Bytes;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::trace;

use crate::core::{Command, Error, ExecOptions, ExecutionOutcome, Result};

/// How often the blocking runner re-checks a child against its deadline.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Execute one command on the ambient async scheduler
///
/// The child is spawned with kill-on-drop, so abandoning the returned future
/// at any await point terminates the process. Stdin is written concurrently
/// with output draining, which keeps large inputs from deadlocking against a
/// full output pipe.
pub async fn execute_command(command: &Command, options: &ExecOptions) -> Result<ExecutionOutcome> {
    if command.program().is_empty() {
        return Err(Error::launch("empty program name"));
    }
    trace!(command = %command, "spawning child process");

    let mut cmd = tokio::process::Command::new(command.program());
    cmd.args(command.argv());
    cmd.kill_on_drop(true);
    if let Some(dir) = &options.working_dir {
        cmd.current_dir(dir);
    }
    cmd.envs(&options.env);
    if options.input.is_some() {
        cmd.stdin(Stdio::piped());
    }
    if options.capture_output {
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
    }

    let mut child = cmd.spawn().map_err(|e| launch_error(command, &e))?;

    let stdin = child.stdin.take();
    let input = options.input.clone();
    let feed = async move {
        if let (Some(mut stdin), Some(data)) = (stdin, input) {
            if let Err(e) = stdin.write_all(&data).await {
                // The child may exit without reading its input.
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
        }
        Ok::<(), std::io::Error>(())
    };

    let capture = options.capture_output;
    let wait = async move {
        if capture {
            let output = child.wait_with_output().await?;
            Ok(ExecutionOutcome::from_output(output))
        } else {
            let status = child.wait().await?;
            Ok(ExecutionOutcome::from_status(status))
        }
    };

    let finished = async {
        let (fed, outcome) = tokio::join!(feed, wait);
        fed?;
        outcome
    };

    match options.timeout {
        // Dropping the elapsed wait future drops the child, which kills it.
        Some(limit) => match tokio::time::timeout(limit, finished).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout(limit)),
        },
        None => finished.await,
    }
}

/// Execute one command synchronously, blocking the calling thread
///
/// This is the worker body for [`PoolStrategy::Thread`](crate::PoolStrategy):
/// the whole spawn-drain-wait cycle runs on one blocking-pool thread. Output
/// streams are drained on dedicated reader threads so a chatty child cannot
/// deadlock against a full pipe while the worker waits on it.
pub fn execute_command_blocking(command: &Command, options: &ExecOptions) -> Result<ExecutionOutcome> {
    if command.program().is_empty() {
        return Err(Error::launch("empty program name"));
    }
    trace!(command = %command, "spawning child process (blocking)");

    let mut cmd = std::process::Command::new(command.program());
    cmd.args(command.argv());
    if let Some(dir) = &options.working_dir {
        cmd.current_dir(dir);
    }
    cmd.envs(&options.env);
    if options.input.is_some() {
        cmd.stdin(Stdio::piped());
    }
    if options.capture_output {
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
    }

    let mut child = cmd.spawn().map_err(|e| launch_error(command, &e))?;

    let writer = match (child.stdin.take(), options.input.clone()) {
        (Some(mut stdin), Some(data)) => Some(std::thread::spawn(move || {
            use std::io::Write;
            match stdin.write_all(&data) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        })),
        _ => None,
    };

    let stdout_reader = child.stdout.take().map(|mut pipe| {
        std::thread::spawn(move || {
            use std::io::Read;
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf).map(|_| buf)
        })
    });
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            use std::io::Read;
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let waited = match options.timeout {
        Some(limit) => wait_with_deadline(&mut child, limit),
        None => child.wait().map_err(Error::from),
    };

    // Join the helper threads on every path; after a kill the pipes hit EOF,
    // so the readers terminate.
    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(Error::pool("stdin writer thread panicked")),
        }
    }
    let stdout = drain_reader(stdout_reader)?;
    let stderr = drain_reader(stderr_reader)?;

    let status = waited?;
    Ok(ExecutionOutcome::from_parts(status, stdout, stderr))
}

/// Wait for a child with a deadline, killing and reaping it on expiry.
fn wait_with_deadline(
    child: &mut std::process::Child,
    limit: Duration,
) -> Result<std::process::ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout(limit));
        }
        std::thread::sleep(WAIT_POLL_INTERVAL);
    }
}

fn drain_reader(
    handle: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
) -> Result<Option<Bytes>> {
    match handle {
        None => Ok(None),
        Some(handle) => match handle.join() {
            Ok(Ok(buf)) => Ok(Some(Bytes::from(buf))),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(Error::pool("output reader thread panicked")),
        },
    }
}

fn launch_error(command: &Command, error: &std::io::Error) -> Error {
    match error.kind() {
        ErrorKind::NotFound => Error::launch(format!("command not found: {}", command.program())),
        ErrorKind::PermissionDenied => {
            Error::launch(format!("permission denied: {}", command.program()))
        }
        _ => Error::launch(format!("{}: {}", command.program(), error)),
    }
}
