//! Connection - handles an individual client connection.
//!
//! Each connection runs in its own tokio task: a framed reader, a framed
//! writer fed from the peer's outgoing queue, and the peer's cancellation
//! token, unified in one `tokio::select!` loop. The rest of the server only
//! ever touches the [`Peer`] handle registered with the session.

use crate::network::Throttle;
use crate::state::{ConnId, Peer, ServerSession};
use futures_util::{SinkExt, StreamExt};
use parley_proto::LineCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

/// Capacity of the per-connection outgoing queue. A peer that falls this far
/// behind is treated as unresponsive and dropped.
const OUTGOING_QUEUE_LEN: usize = 64;

/// A client connection handler.
pub struct Connection {
    id: ConnId,
    addr: SocketAddr,
    session: Arc<ServerSession>,
    stream: TcpStream,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        id: ConnId,
        stream: TcpStream,
        addr: SocketAddr,
        session: Arc<ServerSession>,
    ) -> Self {
        Self {
            id,
            addr,
            session,
            stream,
        }
    }

    /// Run the connection until the client disconnects or is force-closed.
    #[instrument(skip(self), fields(id = %self.id, addr = %self.addr), name = "connection")]
    pub async fn run(self) {
        let relay = self.session.config().relay.clone();
        let (read_half, write_half) = self.stream.into_split();
        let mut reader =
            FramedRead::new(read_half, LineCodec::with_max_len(relay.max_line_len));
        let mut writer =
            FramedWrite::new(write_half, LineCodec::with_max_len(relay.max_line_len));

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<String>(OUTGOING_QUEUE_LEN);
        let peer = Arc::new(Peer::new(self.id.clone(), self.addr, outgoing_tx));
        self.session.register_peer(Arc::clone(&peer));

        let mut throttle = Throttle::new(relay.message_rate, relay.message_burst);

        loop {
            tokio::select! {
                result = reader.next() => {
                    match result {
                        Some(Ok(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            if !throttle.admit() {
                                warn!("Message rate exceeded");
                                let _ = writer
                                    .send("You are sending messages too fast. Goodbye.".to_string())
                                    .await;
                                break;
                            }
                            debug!(raw = %line, "Received line");
                            self.session.handle_chat_from(&peer, &line);
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Read error");
                            break;
                        }
                        None => {
                            info!("Client disconnected");
                            break;
                        }
                    }
                }

                maybe = outgoing_rx.recv() => {
                    match maybe {
                        Some(line) => {
                            if let Err(e) = writer.send(line).await {
                                warn!(error = %e, "Write error");
                                break;
                            }
                        }
                        None => break,
                    }
                }

                _ = peer.closed() => {
                    // Force-closed: flush whatever is queued (e.g. the
                    // rejection notice) before tearing the socket down.
                    while let Ok(line) = outgoing_rx.try_recv() {
                        if writer.send(line).await.is_err() {
                            break;
                        }
                    }
                    info!("Connection force-closed");
                    break;
                }
            }
        }

        self.session.unregister_peer(&peer);
    }
}
