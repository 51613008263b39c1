//! Connection registry traits.
//!
//! A connection is referenced everywhere by its [`ConnectionId`]; only the
//! registry holds the transport handle. Fan-out code depends on the narrow
//! [`ConnectionLookup`] capability so alternate transports and test doubles
//! can be substituted.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use super::value_object::ConnectionId;

/// A frame queued for one connection's socket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    /// Serialized JSON payload. Shared so a broadcast serializes once.
    Text(Arc<str>),
    /// Heartbeat probe.
    Ping,
    /// Ask the writer to close the socket.
    Close,
}

/// Send half of a connection's outbound queue.
pub type PusherChannel = mpsc::UnboundedSender<PushFrame>;

/// Fired once when the registry evicts a connection. The socket tasks select
/// on it, so eviction does not wait for the writer to drain its queue.
pub type EvictionSignal = Arc<Notify>;

/// Result of one heartbeat sweep over the registry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeartbeatSweep {
    /// Connections that did not answer the previous probe and were told to close.
    pub evicted: Vec<ConnectionId>,
    /// Number of connections that were sent a fresh probe.
    pub probed: usize,
}

/// Resolve a connection id to a send-capable handle.
#[async_trait]
pub trait ConnectionLookup: Send + Sync {
    /// Handle of a live connection, or `None` if it is gone.
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<PusherChannel>;

    /// Ids of every registered connection.
    async fn connection_ids(&self) -> Vec<ConnectionId>;
}

/// Owner of all live transport handles and their liveness flags.
#[async_trait]
pub trait ConnectionRegistry: ConnectionLookup {
    /// Store the handle. The id is always freshly generated by the caller.
    ///
    /// Returns the signal fired if the connection is later evicted.
    async fn register(
        &self,
        connection_id: ConnectionId,
        channel: PusherChannel,
    ) -> EvictionSignal;

    /// Remove the handle. Unregistering an absent id is a no-op.
    async fn unregister(&self, connection_id: &ConnectionId);

    /// Record that the connection answered the last probe.
    async fn mark_alive(&self, connection_id: &ConnectionId);

    /// Close connections that missed the previous probe, fire their eviction
    /// signals, and probe the rest.
    async fn sweep_heartbeat(&self) -> HeartbeatSweep;
}
