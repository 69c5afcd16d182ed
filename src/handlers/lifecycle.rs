//! Lifecycle commands: quit, stop, close, start.

use super::ConsoleCtx;
use crate::error::ListenError;
use async_trait::async_trait;
use parley_proto::{Handler, RouteResult};

/// `#quit` - close everything and terminate the process.
pub struct QuitHandler;

#[async_trait]
impl Handler<ConsoleCtx> for QuitHandler {
    async fn handle(&self, ctx: &mut ConsoleCtx, _args: &[String]) -> RouteResult {
        let dropped = ctx.session.close().await;
        ctx.reply(format!("Shutting down ({dropped} connections closed)."))
            .await;
        ctx.quit = true;
        Ok(())
    }
}

/// `#stop` - stop accepting new connections; existing ones stay.
pub struct StopHandler;

#[async_trait]
impl Handler<ConsoleCtx> for StopHandler {
    async fn handle(&self, ctx: &mut ConsoleCtx, _args: &[String]) -> RouteResult {
        if ctx.session.stop_listening().await {
            ctx.reply("Stopped listening for new connections.").await;
        } else {
            ctx.reply("Not currently listening.").await;
        }
        Ok(())
    }
}

/// `#close` - disconnect every client and stop accepting. Terminal.
pub struct CloseHandler;

#[async_trait]
impl Handler<ConsoleCtx> for CloseHandler {
    async fn handle(&self, ctx: &mut ConsoleCtx, _args: &[String]) -> RouteResult {
        let dropped = ctx.session.close().await;
        ctx.reply(format!(
            "Closed {dropped} connections; no longer accepting."
        ))
        .await;
        Ok(())
    }
}

/// `#start` - resume accepting connections. Only legal while stopped.
pub struct StartHandler;

#[async_trait]
impl Handler<ConsoleCtx> for StartHandler {
    async fn handle(&self, ctx: &mut ConsoleCtx, _args: &[String]) -> RouteResult {
        match ctx.session.listen().await {
            Ok(port) => {
                ctx.reply(format!("Listening for connections on port {port}."))
                    .await;
            }
            Err(ListenError::AlreadyListening) => {
                ctx.reply("already listening").await;
            }
            Err(ListenError::Closed) => {
                ctx.reply("Server is closed.").await;
            }
            Err(ListenError::Bind(e)) => {
                ctx.reply(format!("Could not listen for clients: {e}")).await;
            }
        }
        Ok(())
    }
}
