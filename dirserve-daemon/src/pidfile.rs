//! PID-file helpers: liveness checks and signal delivery by name.
//!
//! These back the bundled `dirserve-probe` and `dirserve-signal` plumbing
//! binaries. The lifecycle controller itself never touches pids directly;
//! it shells out to whatever probe/signal facility it was configured with.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::lifecycle::ProcessStatus;

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PID file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("malformed PID file at {path}: {contents:?}")]
    Malformed { path: PathBuf, contents: String },

    #[error("unsupported signal name: {0}")]
    UnknownSignal(String),

    #[error("failed to check pid {pid}: {source}")]
    Check {
        pid: i32,
        #[source]
        source: io::Error,
    },

    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: io::Error,
    },
}

/// Read and parse the process id recorded in `path`.
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// does not hold a positive decimal pid is malformed.
pub fn read_pid(path: &Path) -> Result<Option<i32>, PidFileError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(PidFileError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };

    let trimmed = contents.trim();
    match trimmed.parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(Some(pid)),
        _ => Err(PidFileError::Malformed {
            path: path.to_path_buf(),
            contents: trimmed.to_string(),
        }),
    }
}

/// Probe liveness of the process recorded in `path`.
///
/// A missing PID file and a recorded pid that no longer exists both mean the
/// daemon is stopped. EPERM counts as running: the process exists even if we
/// cannot signal it.
pub fn check_pid_file(path: &Path) -> Result<ProcessStatus, PidFileError> {
    let Some(pid) = read_pid(path)? else {
        return Ok(ProcessStatus::Stopped);
    };

    // SAFETY: kill(2) with signal 0 delivers nothing; the kernel only
    // reports whether the pid exists.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return Ok(ProcessStatus::Running);
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(code) if code == libc::ESRCH => Ok(ProcessStatus::Stopped),
        Some(code) if code == libc::EPERM => Ok(ProcessStatus::Running),
        _ => Err(PidFileError::Check { pid, source: err }),
    }
}

/// Deliver the named signal to the process recorded in `path`.
pub fn signal_pid_file(path: &Path, name: &str) -> Result<(), PidFileError> {
    let signal =
        signal_from_name(name).ok_or_else(|| PidFileError::UnknownSignal(name.to_string()))?;
    let Some(pid) = read_pid(path)? else {
        return Err(PidFileError::NotFound {
            path: path.to_path_buf(),
        });
    };

    // SAFETY: kill(2) is memory-safe for any pid; invalid targets surface
    // as errno.
    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(PidFileError::Signal {
            pid,
            source: io::Error::last_os_error(),
        })
    }
}

/// Translate a signal name (`TERM` or `SIGTERM`) into its number.
fn signal_from_name(name: &str) -> Option<i32> {
    match name.trim_start_matches("SIG") {
        "TERM" => Some(libc::SIGTERM),
        "INT" => Some(libc::SIGINT),
        "HUP" => Some(libc::SIGHUP),
        "KILL" => Some(libc::SIGKILL),
        _ => None,
    }
}
