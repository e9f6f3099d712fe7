//! External commands with a deadline
//!
//! The classifier model and the still-capture tool run as child processes.
//! [`ExternalCommand::run`] spawns the child, drains stdout and stderr on
//! reader threads, and polls for exit until the deadline. A child that
//! misses it is killed and reaped, so the caller never blocks longer than
//! the timeout plus one poll interval.
//!
//! Reader threads are joined only while time remains. If a grandchild
//! keeps a pipe open past the deadline, the threads are detached and end
//! when the pipe closes.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Used when no timeout is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// External command failures
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Deadline passed; the child was killed
    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("waiting for {program} failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// A program, its fixed arguments and a deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Split a whitespace-separated command line
    ///
    /// Returns `None` for an empty line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run with `extra` appended to the fixed arguments
    ///
    /// Returns stdout on a zero exit status.
    pub fn run<I, S>(&self, extra: I) -> Result<Vec<u8>, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait_until(&mut child, deadline)?;
        if !wait_for_readers(&[&stdout, &stderr], deadline) {
            crate::log_warn!("{} output still open after exit", self.program);
            return Err(self.timed_out());
        }

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            return Err(CommandError::Failed {
                program: self.program.clone(),
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        Ok(stdout)
    }

    fn wait_until(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus, CommandError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    let now = Instant::now();
                    if now >= deadline {
                        crate::log_warn!(
                            "{} still running after {:?}, killing it",
                            self.program,
                            self.timeout
                        );
                        self.kill(child);
                        return Err(self.timed_out());
                    }
                    thread::sleep(POLL_INTERVAL.min(deadline - now));
                }
                Err(source) => {
                    self.kill(child);
                    return Err(CommandError::Wait {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        }
    }

    fn kill(&self, child: &mut Child) {
        if let Err(e) = child.kill() {
            crate::log_debug!("Kill {} failed: {}", self.program, e);
        }
        if let Err(e) = child.wait() {
            crate::log_debug!("Reaping {} failed: {}", self.program, e);
        }
    }

    fn timed_out(&self) -> CommandError {
        CommandError::TimedOut {
            program: self.program.clone(),
            timeout: self.timeout,
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                crate::log_debug!("Reading child output failed: {}", e);
            }
        }
        buf
    })
}

/// `false` if the deadline passed with a reader still blocked
fn wait_for_readers(readers: &[&JoinHandle<Vec<u8>>], deadline: Instant) -> bool {
    while !readers.iter().all(|reader| reader.is_finished()) {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
    true
}
