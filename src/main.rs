//! parleyd - a line-oriented broadcast chat daemon.
//!
//! Accepts TCP clients speaking the parley line protocol, binds each to a
//! login identity, and relays every chat line to all connected clients.
//! Operator commands arrive on the server console.

mod config;
mod console;
mod error;
mod handlers;
mod network;
mod state;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::ServerSession;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // CLI: parleyd [port] [config-path]
    let mut args = std::env::args().skip(1);
    let port_arg = args.next();
    let config_path = args.next();

    let mut config = match &config_path {
        Some(path) => Config::load(path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::default(),
    };

    if let Some(raw) = port_arg {
        let port: u16 = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid port argument: {raw}"))?;
        config.listen.port = port;
    }

    info!(
        server = %config.server.name,
        port = config.listen.port,
        "Starting parleyd"
    );

    let session = ServerSession::new(config)
        .map_err(|e| anyhow::anyhow!("invalid listen address: {e}"))?;

    // A failed initial bind is reported but not fatal: the operator can
    // #setport and #start from the console.
    if let Err(e) = session.listen().await {
        error!(error = %e, "Could not listen for clients");
    }

    let gateway_task = tokio::spawn(Gateway::new(session.clone()).run());

    console::run(session.clone()).await;

    // Console returned: ensure the session is closed so the gateway exits.
    session.close().await;
    let _ = gateway_task.await;

    info!("parleyd terminated");
    Ok(())
}
