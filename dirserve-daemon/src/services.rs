//! Daemon-side service wiring.
//!
//! The dispatcher reaches its collaborators through [`Services`], a struct
//! of typed references built once at startup and immutable afterwards.
//! Missing wiring is a compile error, not a runtime lookup failure.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

/// Opaque token naming one live client connection. Allocated by the
/// connection registry when a connection is accepted; dead ids simply fail
/// to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Per-connection outbound channel carrying encoded reply frames.
pub type Outbound = mpsc::Sender<Vec<u8>>;

/// The connection-management service: maps client ids to live outbound
/// channels. Interior locking is this service's own concern; callers only
/// register, resolve, and unregister.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    clients: RwLock<HashMap<ClientId, Outbound>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and allocate its id.
    pub async fn register(&self, outbound: Outbound) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.clients.write().await.insert(id, outbound);
        id
    }

    /// Drop a connection. Requests already in flight for this client
    /// resolve to nothing and are silently discarded.
    pub async fn unregister(&self, client: ClientId) {
        self.clients.write().await.remove(&client);
    }

    /// Look up the outbound channel for `client`, if still connected.
    pub async fn resolve(&self, client: ClientId) -> Option<Outbound> {
        self.clients.read().await.get(&client).cloned()
    }
}

/// Errors raised by a directory engine while computing a result.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("lookup of {key:?} failed: {detail}")]
    Lookup { key: String, detail: String },
}

/// The directory/storage engine interface consumed by the dispatcher.
///
/// Implementations synchronize internally; the dispatcher holds a shared
/// reference and never mutates through it. Methods return `Send` futures so
/// dispatch tasks can run on any worker thread; implementations may still
/// use plain `async fn`.
pub trait DirectoryService: Send + Sync + 'static {
    /// Resolve a single key to its directory value. A miss is `null`, not
    /// an error.
    fn get(&self, key: &str) -> impl Future<Output = Result<Value, DirectoryError>> + Send;

    /// Collect the entries whose `attribute` field equals `value`.
    fn query(
        &self,
        attribute: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Value, DirectoryError>> + Send;
}

/// Typed service references handed to the dispatcher at construction.
pub struct Services<D> {
    pub connections: Arc<ConnectionRegistry>,
    pub directory: Arc<D>,
}
