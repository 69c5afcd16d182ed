//! Operator console command handlers.
//!
//! Commands arrive as lines on the server console, are classified by
//! `parley_proto::Input`, and dispatch through a [`Router`] keyed by command
//! name. Diagnostics (unknown command, usage) stay local to the console;
//! chat lines are logged and broadcast.

mod lifecycle;
mod port;

pub use lifecycle::{CloseHandler, QuitHandler, StartHandler, StopHandler};
pub use port::{GetPortHandler, SetPortHandler};

use crate::state::ServerSession;
use parley_proto::{Input, RouteError, Router};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Context passed to console command handlers.
pub struct ConsoleCtx {
    /// The server session being operated on.
    pub session: Arc<ServerSession>,
    /// Sink for operator-visible diagnostics (drained by the console
    /// printer task).
    pub out: mpsc::Sender<String>,
    /// Set by `#quit`; the console loop exits when it sees this.
    pub quit: bool,
}

impl ConsoleCtx {
    /// Show a diagnostic to the operator.
    pub async fn reply(&self, text: impl Into<String>) {
        let _ = self.out.send(text.into()).await;
    }
}

/// Build the router with every console command registered.
pub fn console_router() -> Router<ConsoleCtx> {
    let mut router = Router::new();
    router.insert("quit", Box::new(QuitHandler));
    router.insert("stop", Box::new(StopHandler));
    router.insert("close", Box::new(CloseHandler));
    router.insert("start", Box::new(StartHandler));
    router.insert("getport", Box::new(GetPortHandler));
    router.insert("setport", Box::new(SetPortHandler));
    router
}

/// Process one line of console input: dispatch a command, or relay a chat
/// line to every connected client.
pub async fn handle_console_line(router: &Router<ConsoleCtx>, ctx: &mut ConsoleCtx, line: &str) {
    match Input::parse(line) {
        Input::Command(cmd) => match router.dispatch(ctx, &cmd).await {
            Ok(()) => {}
            Err(RouteError::Unknown(name)) => {
                let known: Vec<String> =
                    router.names().iter().map(|n| format!("#{n}")).collect();
                ctx.reply(format!(
                    "#{name} does not exist. Available commands: {}",
                    known.join(" ")
                ))
                .await;
            }
            Err(RouteError::Usage(usage)) => {
                ctx.reply(format!("usage: {usage}")).await;
            }
        },
        Input::Chat(text) => {
            info!(message = %text, "Operator message");
            let delivered = ctx.session.broadcast_all(text.trim_end());
            debug!(delivered, "Operator message relayed");
        }
    }
}
