//! Peer - the server-side handle to one connected client.
//!
//! A `Peer` is what the rest of the server sees of a connection: a way to
//! queue outgoing lines, an attribute store, and a cancellation handle. The
//! socket itself stays inside the connection task (`network::connection`).

use crate::error::ConnectionClosed;
use crate::state::ConnId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Reserved attribute key holding the peer's bound login identity.
pub const LOGIN_KEY: &str = "login_id";

/// Handle to one connected client.
pub struct Peer {
    id: ConnId,
    addr: SocketAddr,
    connected_at: DateTime<Utc>,
    /// Outgoing queue, drained by the connection task.
    tx: mpsc::Sender<String>,
    /// Opaque per-connection attributes (holds the login identity).
    attrs: DashMap<String, String>,
    cancel: CancellationToken,
}

impl Peer {
    /// Create a peer handle around an outgoing queue.
    pub fn new(id: ConnId, addr: SocketAddr, tx: mpsc::Sender<String>) -> Self {
        Self {
            id,
            addr,
            connected_at: Utc::now(),
            tx,
            attrs: DashMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// The connection id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remote address of the client.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// When the connection was accepted.
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queue a line for delivery to this peer.
    ///
    /// Fails with [`ConnectionClosed`] once the peer has been closed, or when
    /// its outgoing queue is saturated (an unresponsive peer must not be
    /// allowed to stall delivery to others).
    pub fn send(&self, line: &str) -> Result<(), ConnectionClosed> {
        if self.cancel.is_cancelled() {
            return Err(ConnectionClosed);
        }
        self.tx
            .try_send(line.to_string())
            .map_err(|_| ConnectionClosed)
    }

    /// Force-close this peer. The connection task observes the cancellation
    /// and tears the socket down.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the peer has been closed.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the peer is closed.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    /// Set an attribute on this peer.
    pub fn set_attr(&self, key: &str, value: &str) {
        self.attrs.insert(key.to_string(), value.to_string());
    }

    /// Look up an attribute.
    pub fn attr(&self, key: &str) -> Option<String> {
        self.attrs.get(key).map(|v| v.value().clone())
    }

    /// The bound login identity, if any.
    pub fn login_id(&self) -> Option<String> {
        self.attr(LOGIN_KEY)
    }

    /// Bind the login identity.
    pub fn bind_identity(&self, identity: &str) {
        self.set_attr(LOGIN_KEY, identity);
    }
}
