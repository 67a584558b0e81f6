//! dirserve core library — wire envelopes, message codec, snapshot types.
//!
//! Public API surface:
//! - [`envelope`] — request/reply envelopes and the correlation-id newtype
//! - [`codec`] — byte-level encode/decode with [`CodecError`]
//! - [`snapshot`] — directory snapshot document and loader

pub mod codec;
pub mod envelope;
pub mod snapshot;

pub use codec::CodecError;
pub use envelope::{CorrelationId, ReplyEnvelope, RequestEnvelope};
pub use snapshot::{DirectorySnapshot, SnapshotError};
