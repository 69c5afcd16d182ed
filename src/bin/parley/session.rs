//! ClientSession - the client-side mirror of the server session.
//!
//! Owns at most one upstream link. The link runs in its own task: a framed
//! reader displaying server lines verbatim and a framed writer fed from an
//! outgoing queue. On connect the session announces its identity, which is
//! what the server's login handshake recognizes.

use futures_util::{SinkExt, StreamExt};
use parley_proto::{login, LineCodec};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

/// Capacity of the outgoing queue toward the server.
const OUTGOING_QUEUE_LEN: usize = 32;

/// The upstream link is gone; the chat line was not sent.
#[derive(Debug, Error)]
#[error("not connected to a server")]
pub struct LinkClosed;

/// An established upstream connection.
struct Link {
    tx: mpsc::Sender<String>,
    task: JoinHandle<()>,
}

/// The client session: identity, target endpoint, and the current link.
pub struct ClientSession {
    identity: String,
    host: String,
    port: u16,
    link: Option<Link>,
    /// Set by `#quit`; the console loop exits when it sees this.
    pub quitting: bool,
}

impl ClientSession {
    /// Create a disconnected session.
    pub fn new(identity: String, host: String, port: u16) -> Self {
        Self {
            identity,
            host,
            port,
            link: None,
            quitting: false,
        }
    }

    /// Show a line to the user.
    pub fn display(&self, text: &str) {
        println!("{text}");
    }

    /// The configured host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Change the target host. The caller enforces the disconnected
    /// precondition.
    pub fn set_host(&mut self, host: String) {
        self.host = host;
    }

    /// Change the target port. The caller enforces the disconnected
    /// precondition.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Whether an upstream link is currently alive.
    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(|link| !link.tx.is_closed())
    }

    /// Open the upstream connection and announce the identity.
    pub async fn connect(&mut self) -> std::io::Result<()> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        debug!(host = %self.host, port = self.port, "Connected");

        let (tx, mut rx) = mpsc::channel::<String>(OUTGOING_QUEUE_LEN);
        let task = tokio::spawn(async move {
            let (read_half, write_half) = stream.into_split();
            let mut reader = FramedRead::new(read_half, LineCodec::new());
            let mut writer = FramedWrite::new(write_half, LineCodec::new());

            loop {
                tokio::select! {
                    result = reader.next() => {
                        match result {
                            // Server-origin text is always display, never
                            // re-interpreted as a command.
                            Some(Ok(line)) => println!("{line}"),
                            Some(Err(e)) => {
                                eprintln!("Connection error: {e}");
                                break;
                            }
                            None => break,
                        }
                    }
                    maybe = rx.recv() => {
                        match maybe {
                            Some(line) => {
                                if writer.send(line).await.is_err() {
                                    break;
                                }
                            }
                            // Session dropped the sender: local logoff.
                            None => break,
                        }
                    }
                }
            }
            println!("Connection closed.");
        });

        let announce = login::announcement(&self.identity);
        if tx.send(announce).await.is_err() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "link task ended before login announcement",
            ));
        }

        self.link = Some(Link { tx, task });
        Ok(())
    }

    /// Send a chat line upstream. Fails when there is no live link.
    pub async fn send_chat(&self, line: &str) -> Result<(), LinkClosed> {
        match &self.link {
            Some(link) => link.tx.send(line.to_string()).await.map_err(|_| LinkClosed),
            None => Err(LinkClosed),
        }
    }

    /// Close the upstream link, if any, and wait for it to wind down.
    pub async fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            drop(link.tx);
            let _ = link.task.await;
        }
    }
}
