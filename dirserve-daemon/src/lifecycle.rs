//! Daemon shutdown state machine.
//!
//! Stopping a daemon is probe, signal, poll-until-gone: confirm the process
//! is running, send one graceful signal, then poll the probe on a fixed
//! interval until it reports the process stopped or the retry budget runs
//! out. A probe failure at any point is fatal: the process state is unknown
//! and must not be polled further.
//!
//! Both facilities are external executables (see [`CommandProbe`] and
//! [`CommandSignaller`]); the traits exist so tests can script them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Liveness of the daemon process named by a PID file.
///
/// Derived fresh on every probe, never cached. The probe-failed arm of the
/// facility contract is carried by `Err(LifecycleError)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Stopped,
}

/// Probe facility exit code meaning the process is alive.
pub const PROBE_EXIT_RUNNING: i32 = 0;
/// Probe facility exit code meaning the process is definitively gone.
pub const PROBE_EXIT_NOT_RUNNING: i32 = 100;

/// Signal name sent to request graceful shutdown.
pub const GRACEFUL_SIGNAL: &str = "TERM";

pub const DEFAULT_POLL_MS: u64 = 500;
pub const DEFAULT_MAX_POLLS: u32 = 10;

/// Fatal outcomes of lifecycle control. None of these are retried; the
/// caller surfaces them as a non-zero exit with the diagnostic on stderr.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to run {command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status probe exited with unrecognized code {code:?}: {stderr}")]
    ProbeFailed { code: Option<i32>, stderr: String },

    #[error("signal command exited with code {code:?}: {stderr}")]
    SignalFailed { code: Option<i32>, stderr: String },

    #[error("daemon did not exit after {attempts} polls over {waited:?}")]
    RetryBudgetExhausted { attempts: u32, waited: Duration },
}

/// Queries whether the daemon process named by a PID file is alive.
#[allow(async_fn_in_trait)]
pub trait ProcessProbe {
    async fn probe(&self, pid_file: &Path) -> Result<ProcessStatus, LifecycleError>;
}

/// Delivers a named signal to the daemon process named by a PID file.
#[allow(async_fn_in_trait)]
pub trait SignalSender {
    async fn send(&self, pid_file: &Path, signal: &str) -> Result<(), LifecycleError>;
}

/// [`ProcessProbe`] backed by an external status-check executable invoked
/// with the PID file path as its sole argument.
///
/// Exit code 0 means running, 100 means not running; anything else,
/// including death by signal, is a probe failure.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    command: PathBuf,
}

impl CommandProbe {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ProcessProbe for CommandProbe {
    async fn probe(&self, pid_file: &Path) -> Result<ProcessStatus, LifecycleError> {
        let output = Command::new(&self.command)
            .arg(pid_file)
            .output()
            .await
            .map_err(|source| LifecycleError::Exec {
                command: self.command.display().to_string(),
                source,
            })?;

        match output.status.code() {
            Some(PROBE_EXIT_RUNNING) => Ok(ProcessStatus::Running),
            Some(PROBE_EXIT_NOT_RUNNING) => Ok(ProcessStatus::Stopped),
            code => Err(LifecycleError::ProbeFailed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// [`SignalSender`] backed by an external executable invoked as
/// `<command> <pid-file> <signal-name>`.
#[derive(Debug, Clone)]
pub struct CommandSignaller {
    command: PathBuf,
}

impl CommandSignaller {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl SignalSender for CommandSignaller {
    async fn send(&self, pid_file: &Path, signal: &str) -> Result<(), LifecycleError> {
        let output = Command::new(&self.command)
            .arg(pid_file)
            .arg(signal)
            .output()
            .await
            .map_err(|source| LifecycleError::Exec {
                command: self.command.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(LifecycleError::SignalFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Polling knobs for [`stop_daemon`]. Defaults bound the total wait to 5 s.
#[derive(Debug, Clone)]
pub struct StopConfig {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// How a successful stop concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The process was already gone; no signal was sent.
    AlreadyStopped,
    /// The process exited after the termination signal, confirmed on the
    /// given poll attempt.
    Stopped { polls: u32 },
}

/// Stop the daemon named by `pid_file` and wait for it to exit.
///
/// Stopping an already-stopped daemon succeeds immediately. One graceful
/// signal is sent before the first poll; the signal is never repeated.
pub async fn stop_daemon<P: ProcessProbe, S: SignalSender>(
    probe: &P,
    signaller: &S,
    pid_file: &Path,
    config: &StopConfig,
) -> Result<StopOutcome, LifecycleError> {
    if probe.probe(pid_file).await? == ProcessStatus::Stopped {
        tracing::info!(pid_file = %pid_file.display(), "daemon already stopped");
        return Ok(StopOutcome::AlreadyStopped);
    }

    signaller.send(pid_file, GRACEFUL_SIGNAL).await?;
    tracing::info!(
        pid_file = %pid_file.display(),
        signal = GRACEFUL_SIGNAL,
        "termination signal sent"
    );

    for attempt in 1..=config.max_polls {
        tokio::time::sleep(config.poll_interval).await;
        match probe.probe(pid_file).await? {
            ProcessStatus::Stopped => {
                tracing::info!(attempt, "daemon exit confirmed");
                return Ok(StopOutcome::Stopped { polls: attempt });
            }
            ProcessStatus::Running => {
                tracing::debug!(attempt, "daemon still running");
            }
        }
    }

    Err(LifecycleError::RetryBudgetExhausted {
        attempts: config.max_polls,
        waited: config.poll_interval * config.max_polls,
    })
}

/// [`stop_daemon`] on a throwaway current-thread runtime, for synchronous
/// callers.
pub fn stop_blocking<P: ProcessProbe, S: SignalSender>(
    probe: &P,
    signaller: &S,
    pid_file: &Path,
    config: &StopConfig,
) -> Result<StopOutcome, LifecycleError> {
    blocking_runtime()?.block_on(stop_daemon(probe, signaller, pid_file, config))
}

/// One probe invocation on a throwaway current-thread runtime.
pub fn probe_blocking<P: ProcessProbe>(
    probe: &P,
    pid_file: &Path,
) -> Result<ProcessStatus, LifecycleError> {
    blocking_runtime()?.block_on(probe.probe(pid_file))
}

fn blocking_runtime() -> Result<tokio::runtime::Runtime, LifecycleError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| LifecycleError::Exec {
            command: "tokio-runtime".to_string(),
            source,
        })
}
