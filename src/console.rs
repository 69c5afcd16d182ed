//! Operator console.
//!
//! Reads lines from stdin, routes them through the console command router,
//! and prints diagnostics to stdout from a dedicated printer task. A chat
//! line typed at the console is broadcast to every connected client.
//!
//! Console EOF is not a command: the server keeps serving until the session
//! closes (piped-stdin deployments must not self-terminate).

use crate::handlers::{self, ConsoleCtx};
use crate::network::wait_closed;
use crate::state::ServerSession;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Run the operator console until `#quit` (or until the session closes
/// after stdin ends).
pub async fn run(session: Arc<ServerSession>) {
    let router = handlers::console_router();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            let _ = stdout.write_all(line.as_bytes()).await;
            let _ = stdout.write_all(b"\n").await;
            let _ = stdout.flush().await;
        }
    });

    let mut ctx = ConsoleCtx {
        session: Arc::clone(&session),
        out: out_tx,
        quit: false,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                handlers::handle_console_line(&router, &mut ctx, &line).await;
                if ctx.quit {
                    break;
                }
            }
            Ok(None) => {
                info!("Console input closed; serving until shutdown");
                wait_closed(session.subscribe()).await;
                break;
            }
            Err(e) => {
                error!(error = %e, "Console read error");
                break;
            }
        }
    }

    drop(ctx);
    let _ = printer.await;
}
