//! Wire envelopes for the daemon's client protocol.
//!
//! A request names a command and carries an ordered argument list; a reply
//! echoes the request's correlation id and carries one value per logical
//! return slot. Envelopes are immutable once decoded.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque client-supplied token matching an asynchronous reply to its
/// originating request. Echoed verbatim; never interpreted by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub String);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One decoded client request.
///
/// All three fields are required on the wire; the codec rejects messages
/// missing any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: CorrelationId,
    pub command: String,
    pub args: Vec<Value>,
}

/// One reply to a client request.
///
/// `results` always holds at least one element; a request that produced no
/// value gets an explicit `null` slot rather than an empty sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub id: CorrelationId,
    pub results: Vec<Value>,
}

impl ReplyEnvelope {
    /// Build a single-slot reply for `id`.
    pub fn single(id: CorrelationId, result: Value) -> Self {
        Self {
            id,
            results: vec![result],
        }
    }
}
