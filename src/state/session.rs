//! ServerSession - the server-side state machine.
//!
//! Owns the connection registry, the listening state, and the listener
//! socket itself. State transitions happen only through the methods here,
//! invoked from the operator console's serialized command path; the accept
//! loop observes them through a `watch` channel.

use crate::config::Config;
use crate::error::{ListenError, PortChangeError};
use crate::state::{ConnId, ConnIdGenerator, ConnectionRegistry, Peer};
use parley_proto::login;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

/// Listen backlog for the accept queue.
const BACKLOG: u32 = 1024;

/// Listening state of the server. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Accepting new connections.
    Listening,
    /// Not accepting new connections; existing ones stay connected.
    Stopped,
    /// Listener torn down and every connection force-closed.
    Closed,
}

/// The server-side session: registry + state machine + login policy.
pub struct ServerSession {
    registry: ConnectionRegistry,
    state_tx: watch::Sender<ServerState>,
    /// The bound listener while listening. The accept loop holds the lock
    /// for as long as it accepts, so taking it here synchronizes with the
    /// gateway releasing the port.
    listener: Mutex<Option<TcpListener>>,
    host: IpAddr,
    port: parking_lot::Mutex<u16>,
    ids: ConnIdGenerator,
    config: Config,
}

impl ServerSession {
    /// Build a session from configuration. Starts in `Stopped`; call
    /// [`ServerSession::listen`] to begin accepting.
    pub fn new(config: Config) -> Result<Arc<Self>, std::net::AddrParseError> {
        let host: IpAddr = config.listen.address.parse()?;
        let (state_tx, _) = watch::channel(ServerState::Stopped);
        Ok(Arc::new(Self {
            registry: ConnectionRegistry::new(),
            state_tx,
            listener: Mutex::new(None),
            host,
            port: parking_lot::Mutex::new(config.listen.port),
            ids: ConnIdGenerator::new(),
            config,
        }))
    }

    /// Current state.
    pub fn state(&self) -> ServerState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state transitions (used by the accept loop).
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state_tx.subscribe()
    }

    /// The configured port (the bound port while listening).
    pub fn port(&self) -> u16 {
        *self.port.lock()
    }

    /// Server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The connection registry.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Allocate an id for a newly accepted connection.
    pub fn next_conn_id(&self) -> ConnId {
        self.ids.next()
    }

    /// Bind the listener on the configured port and transition to
    /// `Listening`. On a bind failure the state is left unchanged.
    ///
    /// Returns the bound port (resolves port 0 to the assigned one).
    pub async fn listen(&self) -> Result<u16, ListenError> {
        match self.state() {
            ServerState::Listening => return Err(ListenError::AlreadyListening),
            ServerState::Closed => return Err(ListenError::Closed),
            ServerState::Stopped => {}
        }

        let addr = SocketAddr::new(self.host, self.port());
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(BACKLOG)?;
        let bound = listener.local_addr()?.port();

        *self.port.lock() = bound;
        *self.listener.lock().await = Some(listener);
        self.state_tx.send_replace(ServerState::Listening);
        info!(port = bound, "Listening for connections");
        Ok(bound)
    }

    /// Stop accepting new connections; existing ones stay connected.
    /// Returns `false` (no-op) when not currently listening.
    pub async fn stop_listening(&self) -> bool {
        let stopped = self.state_tx.send_if_modified(|state| {
            if *state == ServerState::Listening {
                *state = ServerState::Stopped;
                true
            } else {
                false
            }
        });
        if stopped {
            // Waits for the accept loop to release the listener, so the
            // port is free again once this returns.
            self.listener.lock().await.take();
            info!("Stopped listening for new connections");
        }
        stopped
    }

    /// Tear down the listener and force-close every registered connection.
    /// Terminal and idempotent. Returns the number of connections closed.
    pub async fn close(&self) -> usize {
        let previous = self.state_tx.send_replace(ServerState::Closed);
        self.listener.lock().await.take();
        let dropped = self.registry.close_all();
        if previous != ServerState::Closed {
            info!(connections = dropped, "Server closed");
        }
        dropped
    }

    /// Change the configured port. Rejected while actively listening.
    pub fn set_port(&self, port: u16) -> Result<(), PortChangeError> {
        if self.state() == ServerState::Listening {
            return Err(PortChangeError::Listening);
        }
        *self.port.lock() = port;
        Ok(())
    }

    /// Access to the listener slot, for the accept loop.
    pub(crate) fn listener_slot(&self) -> &Mutex<Option<TcpListener>> {
        &self.listener
    }

    /// Register a newly accepted connection.
    pub fn register_peer(&self, peer: Arc<Peer>) {
        self.registry.add(Arc::clone(&peer));
        info!(
            peer = %peer.id(),
            addr = %peer.addr(),
            clients = self.registry.len(),
            "New client connected"
        );
    }

    /// Remove a disconnected connection from the registry.
    pub fn unregister_peer(&self, peer: &Peer) {
        self.registry.remove(peer.id());
        let connected_secs = chrono::Utc::now()
            .signed_duration_since(peer.connected_at())
            .num_seconds();
        match peer.login_id() {
            Some(identity) => {
                info!(peer = %peer.id(), %identity, connected_secs, "Client disconnected");
            }
            None => info!(peer = %peer.id(), connected_secs, "Anonymous client disconnected"),
        }
    }

    /// Handle one chat line from a connected client.
    ///
    /// Identified peers get their line broadcast with the `identity> `
    /// prefix. An unidentified peer's line is accepted only as the login
    /// announcement; anything else is rejected and the peer force-closed.
    pub fn handle_chat_from(&self, peer: &Arc<Peer>, line: &str) {
        match peer.login_id() {
            Some(identity) => {
                info!(peer = %peer.id(), %identity, message = %line, "Message received");
                self.broadcast_from(peer, &format!("{identity}> {line}"));
            }
            None => match login::parse_announcement(line) {
                Some(identity) => {
                    peer.bind_identity(identity);
                    info!(peer = %peer.id(), %identity, "Client logged on");
                    self.broadcast_from(peer, line);
                }
                None => {
                    warn!(peer = %peer.id(), "Chat from unidentified client rejected");
                    let _ = peer.send("You must log in before sending messages.");
                    peer.close();
                }
            },
        }
    }

    /// Broadcast a line originating from a peer, honoring the echo policy.
    fn broadcast_from(&self, sender: &Arc<Peer>, line: &str) {
        let exclude = if self.config.relay.echo_to_sender {
            None
        } else {
            Some(sender.id())
        };
        self.registry.broadcast(line, exclude);
    }

    /// Broadcast an operator-originated line to every registered peer.
    pub fn broadcast_all(&self, line: &str) -> usize {
        self.registry.broadcast(line, None)
    }
}
