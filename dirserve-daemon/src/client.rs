//! Synchronous client for the daemon's line-delimited socket protocol.
//!
//! One request, one correlated reply per call. The daemon never sends an
//! error envelope; a failed dispatch is visible only as silence, so every
//! read carries a timeout.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;

use dirserve_core::codec;
use dirserve_core::envelope::{CorrelationId, ReplyEnvelope, RequestEnvelope};

use crate::error::{io_err, DaemonError};
use crate::paths::socket_path;

const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

fn next_correlation_id() -> CorrelationId {
    CorrelationId(format!(
        "cli-{}-{}",
        std::process::id(),
        NEXT_REQUEST.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Send one request to the daemon socket and return its correlated reply.
pub fn send_request(home: &Path, request: &RequestEnvelope) -> Result<ReplyEnvelope, DaemonError> {
    let socket = socket_path(home);
    if !socket.exists() {
        return Err(DaemonError::DaemonNotRunning { socket });
    }

    let mut stream = UnixStream::connect(&socket).map_err(|err| {
        if matches!(
            err.kind(),
            ErrorKind::NotFound | ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset
        ) {
            DaemonError::DaemonNotRunning {
                socket: socket.clone(),
            }
        } else {
            io_err(&socket, err)
        }
    })?;
    stream
        .set_read_timeout(Some(REPLY_TIMEOUT))
        .map_err(|e| io_err(&socket, e))?;

    let payload = codec::encode(request)?;
    stream
        .write_all(&payload)
        .map_err(|e| io_err(&socket, e))?;
    stream.write_all(b"\n").map_err(|e| io_err(&socket, e))?;
    stream.flush().map_err(|e| io_err(&socket, e))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let read = match reader.read_line(&mut line) {
        Ok(read) => read,
        Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            return Err(DaemonError::Protocol(format!(
                "timed out after {REPLY_TIMEOUT:?} waiting for a reply to {}",
                request.id
            )));
        }
        Err(err) => return Err(io_err(&socket, err)),
    };
    if read == 0 {
        return Err(DaemonError::Protocol(
            "daemon closed connection before replying".to_string(),
        ));
    }

    let reply: ReplyEnvelope = codec::decode(line.trim_end().as_bytes())?;
    if reply.id != request.id {
        return Err(DaemonError::Protocol(format!(
            "correlation id mismatch: sent {}, received {}",
            request.id, reply.id
        )));
    }
    Ok(reply)
}

/// Look up one directory key; the reply's first result slot is the value.
pub fn request_get(home: &Path, key: &str) -> Result<Value, DaemonError> {
    let request = RequestEnvelope {
        id: next_correlation_id(),
        command: "get".to_string(),
        args: vec![Value::String(key.to_owned())],
    };
    first_result(send_request(home, &request)?)
}

/// Match directory entries whose `attribute` equals `value`.
pub fn request_query(home: &Path, attribute: &str, value: Value) -> Result<Value, DaemonError> {
    let request = RequestEnvelope {
        id: next_correlation_id(),
        command: "query".to_string(),
        args: vec![Value::String(attribute.to_owned()), value],
    };
    first_result(send_request(home, &request)?)
}

fn first_result(reply: ReplyEnvelope) -> Result<Value, DaemonError> {
    reply
        .results
        .into_iter()
        .next()
        .ok_or_else(|| DaemonError::Protocol("reply carried no result slots".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn request_against_absent_daemon_reports_not_running() {
        let home = TempDir::new().expect("home");
        let result = request_get(home.path(), "/x/y");
        assert!(matches!(
            result,
            Err(DaemonError::DaemonNotRunning { .. })
        ));
    }

    #[test]
    fn correlation_ids_are_unique_per_request() {
        let a = next_correlation_id();
        let b = next_correlation_id();
        assert_ne!(a, b);
    }
}
