//! ConnectionRegistry - the set of live peers.
//!
//! Membership changes only on accept and disconnect. Broadcast iterates over
//! a snapshot, so concurrent add/remove from other connection tasks never
//! invalidates an in-flight delivery pass.

use crate::state::{ConnId, Peer};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// Thread-safe set of live connections, keyed by connection id.
pub struct ConnectionRegistry {
    peers: DashMap<ConnId, Arc<Peer>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            peers: DashMap::new(),
        }
    }

    /// Register a peer.
    pub fn add(&self, peer: Arc<Peer>) {
        self.peers.insert(peer.id().to_string(), peer);
    }

    /// Remove a peer by id.
    pub fn remove(&self, id: &str) -> Option<Arc<Peer>> {
        self.peers.remove(id).map(|(_, peer)| peer)
    }

    /// Look up a peer by id.
    #[allow(dead_code)]
    pub fn get(&self, id: &str) -> Option<Arc<Peer>> {
        self.peers.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Snapshot of all registered peers.
    fn snapshot(&self) -> Vec<Arc<Peer>> {
        self.peers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Deliver a line to every registered peer, optionally excluding one
    /// (usually the sender, when echo is disabled).
    ///
    /// Per-peer failures are isolated: a peer whose queue is closed or
    /// saturated is dropped from the registry and force-closed, and delivery
    /// to the remaining peers continues. Returns the number of successful
    /// deliveries.
    pub fn broadcast(&self, line: &str, exclude: Option<&str>) -> usize {
        let mut delivered = 0;
        for peer in self.snapshot() {
            if exclude.is_some_and(|id| id == peer.id()) {
                continue;
            }
            match peer.send(line) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    warn!(peer = %peer.id(), "Send failed; dropping peer");
                    peer.close();
                    self.peers.remove(peer.id());
                }
            }
        }
        delivered
    }

    /// Force-close every registered peer and empty the registry.
    /// Returns the number of peers closed.
    pub fn close_all(&self) -> usize {
        let peers = self.snapshot();
        let count = peers.len();
        for peer in peers {
            peer.close();
        }
        self.peers.clear();
        count
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
