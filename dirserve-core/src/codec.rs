//! Byte-level message codec.
//!
//! The wire format is UTF-8 JSON text with self-describing field names. Each
//! call handles one complete, already-delimited message; framing (newline
//! delimiting on the daemon socket) belongs to the transport.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Codec error surface.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The byte sequence was not valid UTF-8 JSON, or required fields were
    /// absent or ill-typed.
    #[error("malformed message: {detail}")]
    Malformed { detail: String },

    /// An envelope could not be serialized.
    #[error("failed to encode message: {detail}")]
    Encode { detail: String },
}

/// Serialize an envelope into its wire bytes.
pub fn encode<T: Serialize>(envelope: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(envelope).map_err(|err| CodecError::Encode {
        detail: err.to_string(),
    })
}

/// Deserialize one complete message.
///
/// Fails with [`CodecError::Malformed`] when the bytes are not valid UTF-8,
/// not valid JSON, or missing a required envelope field. The offending
/// message carries no usable correlation id, so callers discard it.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|err| CodecError::Malformed {
        detail: err.to_string(),
    })
}
