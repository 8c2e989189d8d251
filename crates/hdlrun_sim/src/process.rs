//! Blocking external-process invocation with full output capture.
//!
//! Every adapter operation that shells out goes through [`run_tool`]: the
//! calling worker blocks until the child exits, combined stdout/stderr is
//! streamed into the captured output as it is produced, and a non-zero exit
//! becomes a `success = false` outcome rather than an error. A global
//! [`AbortSignal`] (or a per-invocation timeout) terminates the child
//! outright; the kill is surfaced as an aborted, unsuccessful outcome, never
//! silently swallowed.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a child process.
const WAIT_POLL: Duration = Duration::from_millis(10);

/// A shared flag requesting that all in-flight external work stop.
///
/// Cloned into every worker and polled between waits. Once raised it stays
/// raised for the remainder of the run.
#[derive(Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    /// Creates a new, un-raised signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. In-flight children are killed at the next poll.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once the signal has been raised.
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The captured result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// `true` iff the child ran to completion and exited zero.
    pub success: bool,
    /// `true` if the child was killed by the abort signal or the timeout.
    pub aborted: bool,
    /// Combined stdout and stderr, in arrival order.
    pub output: String,
    /// Wall-clock time from spawn to reap.
    pub elapsed: Duration,
}

/// Runs an external tool to completion, capturing combined output.
///
/// Blocks the calling worker. `timeout` bounds the child's lifetime;
/// `abort` is polled while waiting. On either, the child is killed and the
/// outcome is marked aborted and unsuccessful. A spawn failure (missing
/// binary, permissions) is likewise a structured failure carrying the OS
/// error text.
pub fn run_tool(
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
    abort: &AbortSignal,
) -> ToolOutput {
    let start = Instant::now();
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return ToolOutput {
                success: false,
                aborted: false,
                output: format!("failed to start '{program}': {e}"),
                elapsed: start.elapsed(),
            }
        }
    };

    let sink = Arc::new(Mutex::new(String::new()));
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(stdout, Arc::clone(&sink)));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(stderr, Arc::clone(&sink)));
    }

    let deadline = timeout.map(|t| start + t);
    let mut aborted = false;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                let overdue = deadline.is_some_and(|d| Instant::now() >= d);
                if abort.is_aborted() || overdue {
                    let _ = child.kill();
                    aborted = true;
                    break child.wait().ok();
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(_) => {
                let _ = child.kill();
                break child.wait().ok();
            }
        }
    };

    for reader in readers {
        let _ = reader.join();
    }

    let output = sink.lock().unwrap().clone();
    let success = !aborted && status.is_some_and(|s| s.success());
    ToolOutput {
        success,
        aborted,
        output,
        elapsed: start.elapsed(),
    }
}

/// Streams one pipe into the shared output buffer, line by line.
fn spawn_reader(src: impl Read + Send + 'static, sink: Arc<Mutex<String>>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(src);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    let mut out = sink.lock().unwrap();
                    out.push_str(&line);
                    out.push('\n');
                }
                Err(_) => break,
            }
        }
    })
}
