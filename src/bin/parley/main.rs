//! parley - console client for the parley broadcast chat service.
//!
//! Usage: `parley <identity> [host] [port]`. Lines typed at the console are
//! chat unless they start with `#`, in which case they are local commands
//! (`#quit #logoff #login #gethost #getport #sethost <h> #setport <p>`).

mod commands;
mod session;

use crate::session::ClientSession;
use parley_proto::{Input, RouteError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Default server port, matching the daemon.
const DEFAULT_PORT: u16 = 5555;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep the console clean: only warnings unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(identity) = args.next() else {
        eprintln!("usage: parley <identity> [host] [port]");
        std::process::exit(2);
    };
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port: u16 = match args.next() {
        Some(raw) => match raw.parse() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("invalid port argument: {raw}");
                std::process::exit(2);
            }
        },
        None => DEFAULT_PORT,
    };

    let mut session = ClientSession::new(identity, host, port);

    if let Err(e) = session.connect().await {
        session.display(&format!(
            "Cannot open connection to {}:{}: {e}",
            session.host(),
            session.port()
        ));
        std::process::exit(1);
    }

    let router = commands::client_router();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match Input::parse(&line) {
            Input::Command(cmd) => match router.dispatch(&mut session, &cmd).await {
                Ok(()) => {
                    if session.quitting {
                        break;
                    }
                }
                Err(RouteError::Unknown(name)) => {
                    session.display(&format!(
                        "#{name} does not exist. Available commands: \
                         #quit #logoff #login #gethost #getport #sethost <host> #setport <port>"
                    ));
                }
                Err(RouteError::Usage(usage)) => {
                    session.display(&format!("usage: {usage}"));
                }
            },
            Input::Chat(text) => {
                if session.send_chat(&text).await.is_err() {
                    session.display("Could not send message to server. Terminating client.");
                    session.disconnect().await;
                    std::process::exit(1);
                }
            }
        }
    }

    session.disconnect().await;
    Ok(())
}
