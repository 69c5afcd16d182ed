//! Port commands: getport, setport.

use super::ConsoleCtx;
use crate::error::PortChangeError;
use async_trait::async_trait;
use parley_proto::{Handler, RouteError, RouteResult};

/// `#getport` - report the configured port.
pub struct GetPortHandler;

#[async_trait]
impl Handler<ConsoleCtx> for GetPortHandler {
    async fn handle(&self, ctx: &mut ConsoleCtx, _args: &[String]) -> RouteResult {
        let port = ctx.session.port();
        ctx.reply(format!("Current port: {port}")).await;
        Ok(())
    }
}

/// `#setport <port>` - change the configured port. Only legal while the
/// server is not actively listening; takes exactly one numeric argument.
pub struct SetPortHandler;

#[async_trait]
impl Handler<ConsoleCtx> for SetPortHandler {
    async fn handle(&self, ctx: &mut ConsoleCtx, args: &[String]) -> RouteResult {
        let [arg] = args else {
            return Err(RouteError::Usage("#setport <port>"));
        };
        let port: u16 = arg
            .parse()
            .map_err(|_| RouteError::Usage("#setport <port>"))?;

        match ctx.session.set_port(port) {
            Ok(()) => {
                ctx.reply(format!("Port set to {port}.")).await;
            }
            Err(PortChangeError::Listening) => {
                ctx.reply("Cannot change port while listening. Stop the server first.")
                    .await;
            }
        }
        Ok(())
    }
}
