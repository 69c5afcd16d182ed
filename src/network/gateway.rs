//! Gateway - the accept loop, gated by the session state.
//!
//! While the session is `Listening`, the gateway holds the listener slot's
//! lock and accepts connections, spawning one task per client. A state
//! transition wakes the loop; leaving `Listening` drops the listener so the
//! port is released before `stop_listening`/`close` return.

use crate::network::Connection;
use crate::state::{ServerSession, ServerState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument};

/// Accepts incoming connections for a [`ServerSession`].
pub struct Gateway {
    session: Arc<ServerSession>,
}

impl Gateway {
    /// Create a gateway for a session.
    pub fn new(session: Arc<ServerSession>) -> Self {
        Self { session }
    }

    /// Run the accept loop until the session closes.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) {
        let mut state_rx = self.session.subscribe();

        loop {
            let state = *state_rx.borrow_and_update();
            match state {
                ServerState::Closed => break,
                ServerState::Stopped => {
                    if state_rx.changed().await.is_err() {
                        break;
                    }
                }
                ServerState::Listening => {
                    let mut slot = self.session.listener_slot().lock().await;
                    let Some(listener) = slot.as_ref() else {
                        drop(slot);
                        if state_rx.changed().await.is_err() {
                            break;
                        }
                        continue;
                    };

                    loop {
                        tokio::select! {
                            result = listener.accept() => {
                                match result {
                                    Ok((stream, addr)) => {
                                        let id = self.session.next_conn_id();
                                        info!(%addr, %id, "Connection accepted");
                                        let session = Arc::clone(&self.session);
                                        tokio::spawn(async move {
                                            Connection::new(id, stream, addr, session).run().await;
                                        });
                                    }
                                    Err(e) => {
                                        error!(error = %e, "Failed to accept connection");
                                    }
                                }
                            }
                            changed = state_rx.changed() => {
                                if changed.is_err()
                                    || *state_rx.borrow() != ServerState::Listening
                                {
                                    break;
                                }
                            }
                        }
                    }

                    // Release the port before whoever changed the state
                    // proceeds (stop_listening waits on this lock).
                    slot.take();
                }
            }
        }

        info!("Gateway terminated");
    }
}

/// Block until the session state becomes `Closed`.
pub async fn wait_closed(mut state_rx: watch::Receiver<ServerState>) {
    while *state_rx.borrow_and_update() != ServerState::Closed {
        if state_rx.changed().await.is_err() {
            break;
        }
    }
}
