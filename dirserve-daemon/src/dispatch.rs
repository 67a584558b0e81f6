//! Routing of decoded client requests to daemon services.
//!
//! One call to [`Dispatcher::handle`] produces at most one encoded write to
//! the client's outbound channel. Failures on the dispatch path are logged
//! and isolated per request: no reply is sent (the client's own timeout
//! covers it), and nothing propagates to other in-flight requests.

use std::sync::Arc;

use serde_json::Value;

use dirserve_core::codec;
use dirserve_core::envelope::{ReplyEnvelope, RequestEnvelope};

use crate::services::{ClientId, ConnectionRegistry, DirectoryService, Outbound, Services};

pub struct Dispatcher<D> {
    connections: Arc<ConnectionRegistry>,
    directory: Arc<D>,
}

impl<D: DirectoryService> Dispatcher<D> {
    pub fn new(services: Services<D>) -> Self {
        Self {
            connections: services.connections,
            directory: services.directory,
        }
    }

    /// Handle one decoded request on behalf of `client`.
    ///
    /// A client that disconnected between send and processing resolves to
    /// nothing and the request is dropped without a trace beyond debug
    /// logging: an expected race, not a defect.
    pub async fn handle(&self, client: ClientId, request: RequestEnvelope) {
        let Some(outbound) = self.connections.resolve(client).await else {
            tracing::debug!(%client, "dropping request from disconnected client");
            return;
        };

        let RequestEnvelope { id, command, args } = request;

        // Fast path: an argument-less request gets an explicit null slot,
        // never silence.
        if args.is_empty() {
            deliver(&outbound, client, ReplyEnvelope::single(id, Value::Null)).await;
            return;
        }

        match command.as_str() {
            "get" => {
                let Some(key) = args.first().and_then(Value::as_str) else {
                    tracing::warn!(%client, %id, "get: first argument is not a string key");
                    return;
                };
                match self.directory.get(key).await {
                    Ok(value) => {
                        deliver(&outbound, client, ReplyEnvelope::single(id, value)).await;
                    }
                    Err(err) => {
                        tracing::error!(%client, %id, key, error = %err, "directory get failed");
                    }
                }
            }
            "query" => {
                let Some(attribute) = args.first().and_then(Value::as_str) else {
                    tracing::warn!(%client, %id, "query: first argument is not an attribute name");
                    return;
                };
                let Some(value) = args.get(1) else {
                    tracing::warn!(%client, %id, attribute, "query: match value missing");
                    return;
                };
                match self.directory.query(attribute, value).await {
                    Ok(matches) => {
                        deliver(&outbound, client, ReplyEnvelope::single(id, matches)).await;
                    }
                    Err(err) => {
                        tracing::error!(
                            %client, %id, attribute, error = %err,
                            "directory query failed"
                        );
                    }
                }
            }
            other => {
                tracing::warn!(%client, %id, command = other, "unknown command");
            }
        }
    }
}

/// Encode and enqueue one reply frame. Channel send failure means the
/// client disconnected mid-flight; like an unresolvable client id, that is
/// silent by design of the connection race, not an error.
async fn deliver(outbound: &Outbound, client: ClientId, reply: ReplyEnvelope) {
    let frame = match codec::encode(&reply) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(%client, id = %reply.id, error = %err, "failed to encode reply");
            return;
        }
    };
    if outbound.send(frame).await.is_err() {
        tracing::debug!(%client, id = %reply.id, "client went away before reply write");
    }
}
