//! Engine execution.
//!
//! [`EngineBackend`] is the seam between request handling and whatever
//! actually runs the simulation: it takes the encoded stdin text and returns
//! the raw stdout text. [`ProcessEngine`] runs the engine binary as a child
//! process; tests and embedders can pass any closure instead.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{BattleError, Result};

/// Largest seed picked when the caller does not care.
pub const MAX_RANDOM_SEED: u32 = 1_000_000_000;

/// How often a child with a deadline is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    /// Positive random seed.
    pub seed: u32,
    /// Number of independent simulations to run.
    pub num_simulations: u32,
    /// Encoded request text for the engine's stdin.
    pub stdin: String,
}

/// Something that can execute an encoded request.
pub trait EngineBackend {
    /// Run `request` and return the engine's stdout.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Process`] if the engine cannot be started,
    /// [`BattleError::Engine`] if it reports failure and
    /// [`BattleError::Timeout`] if it exceeds a configured time limit.
    fn run(&self, request: &EngineRequest) -> Result<String>;
}

impl<F> EngineBackend for F
where
    F: Fn(&EngineRequest) -> Result<String>,
{
    fn run(&self, request: &EngineRequest) -> Result<String> {
        self(request)
    }
}

/// Replace the "don't care" seed `0` with a random seed in `1..=1_000_000_000`.
#[must_use]
pub fn resolve_seed(seed: u32) -> u32 {
    if seed == 0 {
        rand::thread_rng().gen_range(1..=MAX_RANDOM_SEED)
    } else {
        seed
    }
}

/// Runs the engine executable as a child process.
///
/// The child is invoked as `<path> <seed> <num_simulations>`. Its stdin is
/// fed from a writer thread while stdout and stderr are drained by reader
/// threads, so a chatty engine can never block on a full pipe.
///
/// A time limit covers the whole exchange: waiting for the child and
/// reading its output to the end. Output pipes held open by processes the
/// engine forked count against the same deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEngine {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessEngine {
    /// Create a runner for the executable at `path`, without a time limit.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: None,
        }
    }

    /// Kill the engine if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path of the engine executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured time limit.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn spawn(&self, request: &EngineRequest) -> Result<Child> {
        Command::new(&self.path)
            .arg(request.seed.to_string())
            .arg(request.num_simulations.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.process_error(source))
    }

    fn process_error(&self, source: std::io::Error) -> BattleError {
        BattleError::Process {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn timed_out(&self, timeout: Duration) -> BattleError {
        warn!(path = %self.path.display(), ?timeout, "Engine timed out");
        BattleError::Timeout(timeout)
    }

    /// Wait for exit, killing the child once the deadline passes.
    fn wait(
        &self,
        child: &mut Child,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<ExitStatus> {
        let Some((deadline, timeout)) = deadline else {
            return child.wait().map_err(|e| self.process_error(e));
        };

        loop {
            if let Some(status) = child.try_wait().map_err(|e| self.process_error(e))? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // The child may have exited between the poll and the kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Receive everything a reader thread read, within the deadline.
    fn collect(
        &self,
        reader: Option<Receiver<std::io::Result<Vec<u8>>>>,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<Vec<u8>> {
        let Some(reader) = reader else {
            return Ok(Vec::new());
        };
        let received = match deadline {
            Some((deadline, timeout)) => {
                let left = deadline.saturating_duration_since(Instant::now());
                match reader.recv_timeout(left) {
                    Ok(read) => read,
                    Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(timeout)),
                    Err(RecvTimeoutError::Disconnected) => Err(reader_gone()),
                }
            }
            None => reader.recv().unwrap_or_else(|_| Err(reader_gone())),
        };
        received.map_err(|e| self.process_error(e))
    }
}

impl EngineBackend for ProcessEngine {
    fn run(&self, request: &EngineRequest) -> Result<String> {
        let started = Instant::now();
        debug!(
            path = %self.path.display(),
            seed = request.seed,
            num_simulations = request.num_simulations,
            stdin_bytes = request.stdin.len(),
            "Spawning engine"
        );

        let deadline = self.timeout.map(|timeout| (started + timeout, timeout));
        let mut child = self.spawn(request)?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let writer = child.stdin.take().map(|mut pipe| {
            let input = request.stdin.clone();
            // Dropping the pipe at the end of the thread closes the engine's stdin.
            in_background(move || pipe.write_all(input.as_bytes()))
        });

        let status = self.wait(&mut child, deadline)?;
        let stdout = self.collect(stdout, deadline)?;
        let stderr = self.collect(stderr, deadline)?;

        // A writer still blocked here feeds a process that never reads; leave it.
        match writer.map(|writer| writer.try_recv()) {
            Some(Ok(Err(e))) => debug!("Engine closed stdin early: {e}"),
            Some(Err(TryRecvError::Empty)) => debug!("Engine exited without reading all of stdin"),
            Some(Err(TryRecvError::Disconnected)) => warn!("Engine stdin writer panicked"),
            Some(Ok(Ok(()))) | None => {}
        }

        if !status.success() {
            warn!(path = %self.path.display(), %status, "Engine failed");
            return Err(BattleError::Engine(
                String::from_utf8_lossy(&stderr).into_owned(),
            ));
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            stdout_bytes = stdout.len(),
            "Engine finished"
        );
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Run `task` on a detached thread; its result arrives on the receiver.
fn in_background<T: Send + 'static>(task: impl FnOnce() -> T + Send + 'static) -> Receiver<T> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone once the caller gave up waiting.
        let _ = tx.send(task());
    });
    rx
}

/// Read a pipe to the end on a background thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<std::io::Result<Vec<u8>>> {
    in_background(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn reader_gone() -> std::io::Error {
    std::io::Error::other("engine output reader panicked")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EngineRequest {
        EngineRequest {
            seed: 7,
            num_simulations: 1,
            stdin: "1\n".to_string(),
        }
    }

    #[test]
    fn test_resolve_seed_keeps_explicit_seed() {
        assert_eq!(resolve_seed(42), 42);
        assert_eq!(resolve_seed(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_resolve_seed_picks_positive_seed() {
        for _ in 0..100 {
            let seed = resolve_seed(0);
            assert!((1..=MAX_RANDOM_SEED).contains(&seed));
        }
    }

    #[test]
    fn test_closure_backend() {
        let backend = |req: &EngineRequest| -> Result<String> { Ok(format!("seed={}", req.seed)) };
        assert_eq!(backend.run(&request()).unwrap(), "seed=7");
    }

    #[test]
    fn test_missing_binary_is_process_error() {
        let engine = ProcessEngine::new("/nonexistent/battle-engine-binary");
        let err = engine.run(&request()).unwrap_err();
        match err {
            BattleError::Process { path, .. } => {
                assert_eq!(path, "/nonexistent/battle-engine-binary");
            }
            other => panic!("expected process error, got {other:?}"),
        }
    }

    #[test]
    fn test_builder() {
        let engine = ProcessEngine::new("./build/BattleEngine").with_timeout(Duration::from_secs(3));
        assert_eq!(engine.path(), Path::new("./build/BattleEngine"));
        assert_eq!(engine.timeout(), Some(Duration::from_secs(3)));
    }
}
